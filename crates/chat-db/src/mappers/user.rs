//! User entity <-> model mapper

use chat_core::entities::{User, UserCredentials};
use chat_core::value_objects::UserId;

use crate::models::UserModel;

impl From<UserModel> for User {
    fn from(model: UserModel) -> Self {
        User {
            id: UserId::from_uuid(model.id),
            username: model.username,
            display_name: model.display_name,
            avatar_url: model.avatar_url,
            online: model.online,
            last_seen: model.last_seen,
            created_at: model.created_at,
        }
    }
}

impl From<UserModel> for UserCredentials {
    fn from(mut model: UserModel) -> Self {
        let password_hash = std::mem::take(&mut model.password_hash);
        UserCredentials {
            user: User::from(model),
            password_hash,
        }
    }
}

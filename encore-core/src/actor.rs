use uuid::Uuid;

use encore_shared::{AccountType, Party, User};

use crate::{CoreError, CoreResult};

/// The authenticated user a request acts on behalf of
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub id: Uuid,
    pub account_type: Option<AccountType>,
    pub fullname: String,
}

impl Actor {
    /// The negotiating side, or an authorization error for viewers and
    /// accounts that have not picked a type yet.
    pub fn party(&self) -> CoreResult<Party> {
        self.account_type
            .and_then(Party::of)
            .ok_or_else(|| CoreError::forbidden("Only artists and places can negotiate"))
    }

    pub fn is(&self, account_type: AccountType) -> bool {
        self.account_type == Some(account_type)
    }

    pub fn require(&self, account_type: AccountType) -> CoreResult<()> {
        if self.is(account_type) {
            Ok(())
        } else {
            Err(CoreError::forbidden(format!("Only a {} account can do this", account_type)))
        }
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            account_type: user.account_type,
            fullname: user.profile.fullname.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewer_cannot_negotiate() {
        let mut user = User::new("v@encore.test", None);
        assert!(Actor::from(&user).party().is_err());

        user.account_type = Some(AccountType::Viewer);
        let actor = Actor::from(&user);
        assert!(matches!(actor.party(), Err(CoreError::AuthorizationError(_))));
        assert!(actor.require(AccountType::Place).is_err());

        user.account_type = Some(AccountType::Place);
        assert_eq!(Actor::from(&user).party().unwrap(), Party::Place);
    }
}

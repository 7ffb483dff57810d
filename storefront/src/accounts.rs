//! Accounts: registration, login, profile and address management, plus the
//! admin user-management surface.
//!
//! Passwords are stored as bcrypt hashes and never leave the store layer.
//! Login failures are deliberately vague about which of email and password
//! was wrong; a blocked account gets an explicit message.

use crate::auth::{check_password_policy, hash_password, verify_password, TokenIssuer};
use crate::errors::{ServiceError, ServiceResult, StoreError};
use crate::order::Order;
use crate::store::{Page, Store, UserQuery};
use crate::types::{AddressId, EmailAddress, PersonName, PhoneNumber, UserId};
use crate::user::{AddressDraft, Role, User};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How many of a user's recent orders the admin detail view includes.
const RECENT_ORDERS: usize = 10;

/// Registration input.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    /// Display name.
    pub name: PersonName,
    /// Email address, unique across accounts.
    pub email: EmailAddress,
    /// Plaintext password, checked against the policy then hashed.
    pub password: String,
}

/// Login input.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// Email address.
    pub email: EmailAddress,
    /// Plaintext password.
    pub password: String,
}

/// A successful registration or login: the account plus its bearer token.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    /// The authenticated account.
    pub user: User,
    /// Signed bearer token.
    pub token: String,
}

/// Profile edit input. Absent fields are left unchanged.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileUpdate {
    /// New display name.
    #[serde(default)]
    pub name: Option<PersonName>,
    /// New contact phone.
    #[serde(default)]
    pub phone: Option<PhoneNumber>,
}

/// Password change input.
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordChange {
    /// The current password, re-verified before the change.
    pub current_password: String,
    /// The new password, checked against the policy.
    pub new_password: String,
}

/// Admin edit of another account. Absent fields are left unchanged.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminUserUpdate {
    /// New display name.
    #[serde(default)]
    pub name: Option<PersonName>,
    /// New email; must remain unique.
    #[serde(default)]
    pub email: Option<EmailAddress>,
    /// New role.
    #[serde(default)]
    pub role: Option<Role>,
}

/// An account joined with its recent orders, for the admin detail view.
#[derive(Debug, Clone, Serialize)]
pub struct UserDetail {
    /// The account.
    #[serde(flatten)]
    pub user: User,
    /// The account's most recent orders.
    pub recent_orders: Vec<Order>,
}

/// Account operations.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn Store>,
    tokens: TokenIssuer,
}

impl AccountService {
    /// Create the service over a document store and a token issuer.
    pub fn new(store: Arc<dyn Store>, tokens: TokenIssuer) -> Self {
        Self { store, tokens }
    }

    /// Register a new account and log it in.
    pub async fn register(&self, request: RegisterRequest) -> ServiceResult<AuthResponse> {
        check_password_policy(&request.password)?;
        let user = User::create(request.name, request.email, hash_password(&request.password)?);
        match self.store.insert_user(user.clone()).await {
            Ok(()) => {}
            Err(StoreError::Duplicate) => {
                return Err(ServiceError::business("Email already registered"));
            }
            Err(err) => return Err(err.into()),
        }
        tracing::info!(user = %user.id, "account registered");
        let token = self.tokens.issue(user.id, user.role)?;
        Ok(AuthResponse { user, token })
    }

    /// Log in with email and password.
    pub async fn login(&self, request: LoginRequest) -> ServiceResult<AuthResponse> {
        let user = self
            .store
            .user_by_email(&request.email)
            .await?
            .filter(|u| verify_password(&request.password, &u.password_hash))
            .ok_or_else(|| ServiceError::Unauthorized("Invalid email or password".to_string()))?;
        if !user.is_active {
            return Err(ServiceError::Unauthorized(
                "Account is blocked. Contact support".to_string(),
            ));
        }
        let token = self.tokens.issue(user.id, user.role)?;
        Ok(AuthResponse { user, token })
    }

    /// Update the actor's own profile.
    pub async fn update_profile(&self, actor: &User, update: ProfileUpdate) -> ServiceResult<User> {
        let mut user = actor.clone();
        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(phone) = update.phone {
            user.phone = Some(phone);
        }
        user.updated_at = chrono::Utc::now();
        self.store.update_user(user.clone()).await?;
        Ok(user)
    }

    /// Change the actor's password, re-verifying the current one.
    pub async fn change_password(&self, actor: &User, change: PasswordChange) -> ServiceResult<()> {
        if !verify_password(&change.current_password, &actor.password_hash) {
            return Err(ServiceError::Unauthorized(
                "Current password is incorrect".to_string(),
            ));
        }
        check_password_policy(&change.new_password)?;
        let mut user = actor.clone();
        user.password_hash = hash_password(&change.new_password)?;
        user.updated_at = chrono::Utc::now();
        self.store.update_user(user).await?;
        Ok(())
    }

    /// Add a saved address to the actor's address book.
    pub async fn add_address(&self, actor: &User, draft: AddressDraft) -> ServiceResult<User> {
        let mut user = actor.clone();
        user.add_address(draft);
        self.store.update_user(user.clone()).await?;
        Ok(user)
    }

    /// Edit one of the actor's saved addresses.
    pub async fn update_address(
        &self,
        actor: &User,
        id: AddressId,
        draft: AddressDraft,
    ) -> ServiceResult<User> {
        let mut user = actor.clone();
        user.update_address(id, draft)?;
        self.store.update_user(user.clone()).await?;
        Ok(user)
    }

    /// Remove one of the actor's saved addresses.
    pub async fn remove_address(&self, actor: &User, id: AddressId) -> ServiceResult<User> {
        let mut user = actor.clone();
        user.remove_address(id)?;
        self.store.update_user(user.clone()).await?;
        Ok(user)
    }

    /// Admin: filtered, paginated user listing.
    pub async fn list_users(&self, query: &UserQuery) -> ServiceResult<Page<User>> {
        Ok(self.store.list_users(query).await?)
    }

    /// Admin: one account with its recent orders.
    pub async fn get_user(&self, id: UserId) -> ServiceResult<UserDetail> {
        let user = self
            .store
            .user(id)
            .await?
            .ok_or(ServiceError::NotFound("User"))?;
        let mut recent_orders = self.store.orders_for_user(id).await?;
        recent_orders.truncate(RECENT_ORDERS);
        Ok(UserDetail {
            user,
            recent_orders,
        })
    }

    /// Admin: edit another account. Email changes must stay unique; password
    /// changes are not available through this surface.
    pub async fn update_user(&self, id: UserId, update: AdminUserUpdate) -> ServiceResult<User> {
        let mut user = self
            .store
            .user(id)
            .await?
            .ok_or(ServiceError::NotFound("User"))?;
        if let Some(email) = update.email {
            if email != user.email {
                if self.store.user_by_email(&email).await?.is_some() {
                    return Err(ServiceError::business("Email already registered"));
                }
                user.email = email;
            }
        }
        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(role) = update.role {
            user.role = role;
        }
        user.updated_at = chrono::Utc::now();
        self.store.update_user(user.clone()).await?;
        Ok(user)
    }

    /// Admin: delete an account. Admin accounts cannot be deleted.
    pub async fn delete_user(&self, id: UserId) -> ServiceResult<()> {
        let user = self
            .store
            .user(id)
            .await?
            .ok_or(ServiceError::NotFound("User"))?;
        if user.is_admin() {
            return Err(ServiceError::business("Admin accounts cannot be deleted"));
        }
        self.store.delete_user(id).await?;
        tracing::info!(user = %id, "account deleted");
        Ok(())
    }

    /// Admin: block or unblock an account. Admin accounts cannot be blocked.
    pub async fn toggle_status(&self, id: UserId) -> ServiceResult<User> {
        let mut user = self
            .store
            .user(id)
            .await?
            .ok_or(ServiceError::NotFound("User"))?;
        if user.is_admin() {
            return Err(ServiceError::business("Admin accounts cannot be blocked"));
        }
        user.is_active = !user.is_active;
        user.updated_at = chrono::Utc::now();
        self.store.update_user(user.clone()).await?;
        Ok(user)
    }
}

// src/services/user_service.rs
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing;
use uuid::Uuid;

use crate::{
    errors::{DispatchError, DispatchResult},
    models::{
        AdminUser, ClientRegistration, ClientUser, CommandReceipt, CreateUserRequest,
        DriverRegistration, DriverUser, LoginRequest, LoginResponse, ManagerUser, Role,
        UpdateUserRequest, User, UserBase, UserResponse, UserStatus, VehicleInfo,
    },
    services::store_service::{SEED_ADMIN_ID, SEED_MANAGER_ID, StoreService},
    utils::id_generator::{IdGenerator, IdType},
};

#[async_trait]
pub trait UserOperations: Send + Sync {
    async fn login(&self, login: LoginRequest) -> DispatchResult<LoginResponse>;
    async fn logout(&self, token: &str);
    async fn register_client(&self, reg: ClientRegistration) -> DispatchResult<CommandReceipt>;
    async fn register_driver(&self, reg: DriverRegistration) -> DispatchResult<CommandReceipt>;
    async fn create_user(
        &self,
        token: &str,
        req: CreateUserRequest,
    ) -> DispatchResult<CommandReceipt>;
    async fn update_user(
        &self,
        token: &str,
        user_id: &str,
        req: UpdateUserRequest,
    ) -> DispatchResult<CommandReceipt>;
    async fn delete_user(&self, token: &str, user_id: &str) -> DispatchResult<CommandReceipt>;
    async fn set_user_status(
        &self,
        token: &str,
        user_id: &str,
        status: UserStatus,
    ) -> DispatchResult<CommandReceipt>;
    async fn get_user(&self, token: &str, user_id: &str) -> DispatchResult<UserResponse>;
    async fn list_users(&self, token: &str) -> DispatchResult<Vec<UserResponse>>;
}

pub struct UserService {
    store: Arc<StoreService>,
    // token -> user id; tokens are ephemeral, never persisted
    sessions: RwLock<HashMap<String, String>>,
}

impl UserService {
    pub fn new(store: Arc<StoreService>) -> Self {
        Self {
            store,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve a session token to the user as currently stored. The lookup
    /// re-reads the store so a caller never acts on a stale record.
    pub async fn authenticate(&self, token: &str) -> DispatchResult<User> {
        let user_id = {
            let sessions = self.sessions.read().await;
            sessions
                .get(token)
                .cloned()
                .ok_or_else(|| DispatchError::unauthorized("invalid or expired session"))?
        };

        self.store
            .read(|state| state.user(&user_id).cloned())
            .await
            .ok_or_else(|| DispatchError::unauthorized("session user no longer exists"))
    }

    /// Authenticate and check the caller holds one of the given roles.
    pub async fn require_role(&self, token: &str, roles: &[Role]) -> DispatchResult<User> {
        let user = self.authenticate(token).await?;
        if roles.contains(&user.role()) {
            Ok(user)
        } else {
            Err(DispatchError::unauthorized(
                "your role is not allowed to perform this action",
            ))
        }
    }

    fn driver_defaults(base: UserBase, vehicle: VehicleInfo) -> DriverUser {
        DriverUser {
            last_settlement_at: base.created_at,
            base,
            id_card_front_url: None,
            id_card_back_url: None,
            vehicle,
            available: false,
            location: None,
            reputation: 100,
            earnings_since_last_settlement: 0.0,
            complaints_count: 0,
        }
    }
}

#[async_trait]
impl UserOperations for UserService {
    async fn login(&self, login: LoginRequest) -> DispatchResult<LoginResponse> {
        let user = self
            .store
            .read(|state| {
                state
                    .users
                    .iter()
                    .find(|u| {
                        u.username() == login.username
                            && u.base().password == login.password
                            && login.role.is_none_or(|r| u.role() == r)
                    })
                    .cloned()
            })
            .await
            .ok_or_else(|| DispatchError::unauthorized("invalid credentials"))?;

        // Pending/expelled accounts stay out; platform staff always get in.
        if user.status() != UserStatus::Active
            && !matches!(user.role(), Role::Admin | Role::Manager)
        {
            return Err(DispatchError::unauthorized(
                "account pending or expelled; contact the manager",
            ));
        }

        let token = Uuid::new_v4().to_string();
        self.sessions
            .write()
            .await
            .insert(token.clone(), user.id().to_string());

        tracing::info!("User logged in: {} ({:?})", user.username(), user.role());

        Ok(LoginResponse {
            user: UserResponse::from(&user),
            token,
        })
    }

    async fn logout(&self, token: &str) {
        if self.sessions.write().await.remove(token).is_some() {
            tracing::debug!("Session closed");
        }
    }

    async fn register_client(&self, reg: ClientRegistration) -> DispatchResult<CommandReceipt> {
        tracing::info!("Registering client: {}", reg.username);

        self.store
            .update(|state| {
                if state.username_taken(&reg.username) {
                    return Err(DispatchError::DuplicateUsername(reg.username.clone()));
                }

                let client = ClientUser {
                    base: UserBase {
                        id: IdGenerator::generate(IdType::Client),
                        username: reg.username.clone(),
                        password: reg.password.clone(),
                        full_name: reg.full_name.clone(),
                        phone: reg.phone.clone(),
                        national_id: reg.national_id.clone(),
                        status: UserStatus::Pending,
                        created_at: Utc::now(),
                    },
                    id_card_front_url: reg.id_card_front_url.clone(),
                    id_card_back_url: reg.id_card_back_url.clone(),
                };
                let id = client.base.id.clone();
                state.users.push(User::Client(client));
                Ok(CommandReceipt::created(id))
            })
            .await
    }

    async fn register_driver(&self, reg: DriverRegistration) -> DispatchResult<CommandReceipt> {
        tracing::info!("Registering driver: {}", reg.username);

        self.store
            .update(|state| {
                if state.username_taken(&reg.username) {
                    return Err(DispatchError::DuplicateUsername(reg.username.clone()));
                }

                let base = UserBase {
                    id: IdGenerator::generate(IdType::Driver),
                    username: reg.username.clone(),
                    password: reg.password.clone(),
                    full_name: reg.full_name.clone(),
                    phone: reg.phone.clone(),
                    national_id: reg.national_id.clone(),
                    status: UserStatus::Pending,
                    created_at: Utc::now(),
                };
                let mut driver = Self::driver_defaults(base, reg.vehicle.clone());
                driver.id_card_front_url = reg.id_card_front_url.clone();
                driver.id_card_back_url = reg.id_card_back_url.clone();

                let id = driver.base.id.clone();
                state.users.push(User::Driver(driver));
                Ok(CommandReceipt::created(id))
            })
            .await
    }

    async fn create_user(
        &self,
        token: &str,
        req: CreateUserRequest,
    ) -> DispatchResult<CommandReceipt> {
        self.require_role(token, &[Role::Manager, Role::Admin]).await?;

        tracing::info!("Creating {:?} account: {}", req.role, req.username);

        self.store
            .update(|state| {
                if state.username_taken(&req.username) {
                    return Err(DispatchError::DuplicateUsername(req.username.clone()));
                }

                let id_type = match req.role {
                    Role::Client => IdType::Client,
                    Role::Driver => IdType::Driver,
                    Role::Admin | Role::Manager => IdType::User,
                };
                let base = UserBase {
                    id: IdGenerator::generate(id_type),
                    username: req.username.clone(),
                    password: req.password.clone(),
                    full_name: req.full_name.clone(),
                    phone: req.phone.clone(),
                    national_id: req.national_id.clone(),
                    status: req.status.unwrap_or(UserStatus::Active),
                    created_at: Utc::now(),
                };
                let id = base.id.clone();

                let user = match req.role {
                    Role::Admin => User::Admin(AdminUser { base }),
                    Role::Manager => User::Manager(ManagerUser { base }),
                    Role::Client => User::Client(ClientUser {
                        base,
                        id_card_front_url: None,
                        id_card_back_url: None,
                    }),
                    Role::Driver => User::Driver(Self::driver_defaults(
                        base,
                        req.vehicle.clone().unwrap_or_default(),
                    )),
                };

                state.users.push(user);
                Ok(CommandReceipt::created(id))
            })
            .await
    }

    async fn update_user(
        &self,
        token: &str,
        user_id: &str,
        req: UpdateUserRequest,
    ) -> DispatchResult<CommandReceipt> {
        self.require_role(token, &[Role::Manager, Role::Admin]).await?;

        self.store
            .update(|state| {
                let user = state
                    .user_mut(user_id)
                    .ok_or_else(|| DispatchError::user_not_found(user_id))?;

                let base = user.base_mut();
                if let Some(password) = &req.password {
                    base.password = password.clone();
                }
                if let Some(full_name) = &req.full_name {
                    base.full_name = full_name.clone();
                }
                if let Some(phone) = &req.phone {
                    base.phone = phone.clone();
                }
                if let Some(national_id) = &req.national_id {
                    base.national_id = national_id.clone();
                }
                if let Some(status) = req.status {
                    base.status = status;
                }
                if let (Some(vehicle), Some(driver)) = (&req.vehicle, user.as_driver_mut()) {
                    driver.vehicle = vehicle.clone();
                }

                tracing::debug!("User updated: {}", user_id);
                Ok(CommandReceipt::done())
            })
            .await
    }

    async fn delete_user(&self, token: &str, user_id: &str) -> DispatchResult<CommandReceipt> {
        let me = self.require_role(token, &[Role::Manager, Role::Admin]).await?;

        if user_id == SEED_ADMIN_ID || user_id == SEED_MANAGER_ID {
            return Err(DispatchError::SeedAccountProtected);
        }
        if me.id() == user_id {
            return Err(DispatchError::SelfDeletion);
        }

        self.store
            .update(|state| {
                let before = state.users.len();
                state.users.retain(|u| u.id() != user_id);
                if state.users.len() == before {
                    return Err(DispatchError::user_not_found(user_id));
                }
                Ok(())
            })
            .await?;

        // Any live sessions for the removed account die with it.
        self.sessions
            .write()
            .await
            .retain(|_, session_user| session_user != user_id);

        tracing::info!("User deleted: {}", user_id);
        Ok(CommandReceipt::done())
    }

    async fn set_user_status(
        &self,
        token: &str,
        user_id: &str,
        status: UserStatus,
    ) -> DispatchResult<CommandReceipt> {
        self.require_role(token, &[Role::Manager, Role::Admin]).await?;

        self.store
            .update(|state| {
                let user = state
                    .user_mut(user_id)
                    .ok_or_else(|| DispatchError::user_not_found(user_id))?;
                user.base_mut().status = status;
                tracing::info!("User {} status set to {:?}", user_id, status);
                Ok(CommandReceipt::done())
            })
            .await
    }

    async fn get_user(&self, token: &str, user_id: &str) -> DispatchResult<UserResponse> {
        self.require_role(token, &[Role::Manager, Role::Admin]).await?;

        self.store
            .read(|state| state.user(user_id).map(UserResponse::from))
            .await
            .ok_or_else(|| DispatchError::user_not_found(user_id))
    }

    async fn list_users(&self, token: &str) -> DispatchResult<Vec<UserResponse>> {
        self.require_role(token, &[Role::Manager, Role::Admin]).await?;

        Ok(self
            .store
            .read(|state| state.users.iter().map(UserResponse::from).collect())
            .await)
    }
}

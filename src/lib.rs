pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod request_logger;
pub mod routes;
pub mod store;

use std::sync::{Arc, Once};

use env_logger::Env;
use rocket::fairing::AdHoc;
use rocket::http::Method;
use rocket::{Build, Rocket};
use rocket_cors::{AllowedOrigins, CorsOptions};
use rocket_db_pools::Database;

use crate::auth::{AuthConfig, AuthState};
use crate::db::IdentityDb;
use crate::request_logger::RequestLogger;
use crate::store::PgUserStore;

static LOGGER: Once = Once::new();

fn init_logger() {
    LOGGER.call_once(|| {
        env_logger::Builder::from_env(
            Env::default().default_filter_or("info,rocket::server=warn,rocket::request=warn"),
        )
        .init();
    });
}

/// Every HTTP route exposed by the API, for mounting under `/api`.
pub fn api_routes() -> Vec<rocket::Route> {
    rocket::routes![
        routes::health::health_check,
        auth::routes::register,
        auth::routes::login,
        routes::users::list_users,
        routes::users::get_user,
        routes::users::update_profile,
        routes::users::update_role,
        routes::users::delete_user,
    ]
}

pub fn rocket() -> Rocket<Build> {
    init_logger();

    log::info!("starting identity API server");

    // Allow browser clients (the registration/login forms) to call the API.
    let cors = CorsOptions::default()
        .allowed_origins(AllowedOrigins::all())
        .allowed_methods(
            vec![Method::Get, Method::Post, Method::Put, Method::Delete]
                .into_iter()
                .map(From::from)
                .collect(),
        )
        .allow_credentials(true)
        .to_cors()
        .expect("Error creating CORS");

    rocket::build()
        .attach(RequestLogger)
        .attach(IdentityDb::init())
        .attach(cors)
        .attach(AdHoc::try_on_ignite("Run Migrations", |rocket| async move {
            match IdentityDb::fetch(&rocket) {
                Some(db) => {
                    let pool = (**db).clone();
                    match db::run_migrations(&pool).await {
                        Ok(_) => {
                            log::info!("database migrations successful");
                            Ok(rocket)
                        }
                        Err(e) => {
                            log::error!("database migrations failed: {}", e);
                            Err(rocket)
                        }
                    }
                }
                None => {
                    log::error!("database pool not available for migrations");
                    Err(rocket)
                }
            }
        }))
        .attach(AdHoc::try_on_ignite(
            "Configure Auth Pipeline",
            |rocket| async move {
                let pool = match IdentityDb::fetch(&rocket) {
                    Some(db) => (**db).clone(),
                    None => {
                        log::error!("database pool not available for auth state");
                        return Err(rocket);
                    }
                };

                let config = match AuthConfig::from_env() {
                    Ok(config) => config,
                    Err(err) => {
                        log::error!("auth configuration invalid: {}", err);
                        return Err(rocket);
                    }
                };

                let store = Arc::new(PgUserStore::new(pool));
                match AuthState::new(config, store) {
                    Ok(state) => Ok(rocket.manage(state)),
                    Err(err) => {
                        log::error!("failed to construct auth state: {}", err);
                        Err(rocket)
                    }
                }
            },
        ))
        .mount("/api", api_routes())
}

#[cfg_attr(not(test), allow(dead_code))]
pub mod test_support {
    use std::sync::Arc;

    use rocket::config::LogLevel;
    use rocket::figment::Figment;
    use rocket::local::asynchronous::Client as AsyncClient;
    use rocket::local::blocking::Client;
    use rocket::{Build, Rocket, Route};

    use crate::auth::{AuthConfig, AuthState};
    use crate::store::MemoryUserStore;

    pub const TEST_JWT_SECRET: &str = "integration-test-signing-secret";

    /// Auth pipeline over the in-memory store. The store handle is
    /// returned alongside so tests can seed and mutate identities
    /// directly, e.g. to promote a user to admin.
    pub fn memory_auth_state() -> (AuthState, Arc<MemoryUserStore>) {
        let store = Arc::new(MemoryUserStore::new());
        let config = AuthConfig {
            jwt_secret: TEST_JWT_SECRET.into(),
            token_ttl_secs: 900,
        };
        let state =
            AuthState::new(config, store.clone()).expect("auth state for tests");
        (state, store)
    }

    /// Builder for constructing Rocket instances tailored for integration
    /// tests: random port, logging off, no database pool.
    #[derive(Default)]
    pub struct TestRocketBuilder {
        figment: Figment,
        mounts: Vec<(String, Vec<Route>)>,
        auth_state: Option<AuthState>,
    }

    impl TestRocketBuilder {
        pub fn new() -> Self {
            let figment = rocket::Config::figment()
                .merge(("port", 0))
                .merge(("log_level", LogLevel::Off))
                .merge(("cli_colors", false));

            Self {
                figment,
                mounts: Vec::new(),
                auth_state: None,
            }
        }

        /// Mount routes under `/api`.
        pub fn mount_api_routes(mut self, routes: Vec<Route>) -> Self {
            self.mounts.push(("/api".to_string(), routes));
            self
        }

        pub fn manage_auth_state(mut self, state: AuthState) -> Self {
            self.auth_state = Some(state);
            self
        }

        pub fn build(self) -> Rocket<Build> {
            let mut rocket = rocket::custom(self.figment);

            for (base, routes) in self.mounts {
                rocket = rocket.mount(base, routes);
            }

            if let Some(state) = self.auth_state {
                rocket = rocket.manage(state);
            }

            rocket
        }

        pub fn blocking_client(self) -> Client {
            Client::tracked(self.build()).expect("valid Rocket instance")
        }

        pub async fn async_client(self) -> AsyncClient {
            AsyncClient::tracked(self.build())
                .await
                .expect("valid Rocket instance")
        }
    }

    /// Full API surface over a fresh in-memory store.
    pub fn api_rocket() -> (Rocket<Build>, Arc<MemoryUserStore>) {
        let (state, store) = memory_auth_state();
        let rocket = TestRocketBuilder::new()
            .mount_api_routes(crate::api_routes())
            .manage_auth_state(state)
            .build();
        (rocket, store)
    }
}

//! Shared fixtures for handler tests.

use std::sync::Arc;
use std::time::Duration;

use actix_web::web;
use chrono::{TimeZone, Utc};

use crate::auth::jwt::generate_access_token;
use crate::config::Config;
use crate::model::role::Role;
use crate::store::RecordStore;
use crate::utils::clock::{Clock, FixedClock};
use crate::utils::report_cache::ReportCache;

pub fn test_config() -> Config {
    Config {
        database_url: "mysql://unused".to_string(),
        jwt_secret: "handler-test-secret".to_string(),
        server_addr: "127.0.0.1:0".to_string(),
        access_token_ttl: 900,
        refresh_token_ttl: 3600,
        rate_login_per_min: 60,
        rate_refresh_per_min: 30,
        rate_protected_per_min: 1000,
        api_prefix: "/api".to_string(),
        leave_notice_days: 7,
        report_cache_ttl_secs: 60,
        log_dir: "logs".to_string(),
    }
}

/// 2026-10-17 15:30 UTC
pub fn fixed_clock() -> FixedClock {
    FixedClock(Utc.with_ymd_and_hms(2026, 10, 17, 15, 30, 0).unwrap())
}

/// Registers the store, a fixed clock, a fresh report cache and the test
/// config as app data.
pub fn app_data<S>(store: Arc<S>) -> impl FnOnce(&mut web::ServiceConfig)
where
    S: RecordStore + 'static,
{
    move |cfg| {
        let store: Arc<dyn RecordStore> = store;
        let clock: Arc<dyn Clock> = Arc::new(fixed_clock());
        cfg.app_data(web::Data::from(store))
            .app_data(web::Data::from(clock))
            .app_data(web::Data::new(ReportCache::new(Duration::from_secs(60))))
            .app_data(web::Data::new(test_config()));
    }
}

/// `Authorization` header carrying an access token for the given identity.
pub fn bearer(user_id: u64, role: Role, employee_id: Option<u64>) -> (&'static str, String) {
    let token = generate_access_token(
        user_id,
        format!("user{user_id}"),
        role.id(),
        employee_id,
        &test_config().jwt_secret,
        900,
    )
    .unwrap();
    ("Authorization", format!("Bearer {token}"))
}

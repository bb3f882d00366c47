//! Service wiring: stores, notification flows, credentials and tokens.

use std::sync::Arc;

use anyhow::Context;

use cargodesk_auth::{AdminCredentials, Hs256Tokens, SessionTokens};
use cargodesk_core::Locale;
use cargodesk_infra::{
    AppConfig, ContainerNotifier, NotifyContext, OrderNotifier, Stores, TrackingLinks,
};
use cargodesk_notify::{
    EmailSender, HttpEmailSender, LogOnlySender, NotificationDispatcher, SmsSender, TwilioSmsSender,
};

/// Everything the handlers need, shared behind an `Arc`.
pub struct AppServices {
    pub stores: Stores,
    pub containers: ContainerNotifier,
    pub orders: OrderNotifier,
    pub links: TrackingLinks,
    pub admin: AdminCredentials,
    pub tokens: Arc<dyn SessionTokens>,
}

impl AppServices {
    pub fn new(
        stores: Stores,
        dispatcher: NotificationDispatcher,
        links: TrackingLinks,
        default_locale: Locale,
        admin: AdminCredentials,
        tokens: Arc<dyn SessionTokens>,
    ) -> Self {
        let ctx = NotifyContext {
            stores: stores.clone(),
            dispatcher,
            links: links.clone(),
            default_locale,
        };
        Self {
            stores,
            containers: ContainerNotifier::new(ctx.clone()),
            orders: OrderNotifier::new(ctx),
            links,
            admin,
            tokens,
        }
    }

    /// Production wiring from configuration.
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let stores = match &config.database {
            Some(db) => {
                let pool = cargodesk_infra::connect_database(db)
                    .await
                    .context("failed to connect to Postgres")?;
                tracing::info!(max_connections = db.max_connections, "using Postgres stores");
                Stores::postgres(pool)
            }
            None => {
                tracing::warn!("DATABASE_URL not set; using in-memory stores (data is lost on restart)");
                Stores::in_memory()
            }
        };

        let email: Arc<dyn EmailSender> = match &config.email {
            Some(cfg) => Arc::new(HttpEmailSender::new(cfg.clone()).context("email sender")?),
            None => {
                tracing::warn!("email provider not configured; emails are logged only");
                Arc::new(LogOnlySender)
            }
        };
        let sms: Arc<dyn SmsSender> = match &config.sms {
            Some(cfg) => Arc::new(TwilioSmsSender::new(cfg.clone()).context("sms sender")?),
            None => {
                tracing::warn!("sms provider not configured; messages are logged only");
                Arc::new(LogOnlySender)
            }
        };

        let tokens = Hs256Tokens::new(
            config.session.secret.as_bytes(),
            chrono::Duration::minutes(config.session.ttl_minutes),
        );

        Ok(Self::new(
            stores,
            NotificationDispatcher::new(email, sms),
            TrackingLinks::new(config.public_base_url.clone()),
            config.default_locale,
            AdminCredentials::new(config.admin.username.clone(), config.admin.password.clone()),
            Arc::new(tokens),
        ))
    }
}

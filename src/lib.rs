//! Order intake and back-office service for the 祖父の蔵 rice farm.
//!
//! Customers place rice orders, the farm records trades and special orders,
//! and the admin dashboard reads every order document back to compute
//! inventory consumption and history totals.

extern crate config as config_crate;
#[macro_use]
extern crate derive_more;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate serde_json;

pub mod config;
pub mod controller;
pub mod errors;
pub mod http;
pub mod migrations;
pub mod models;
pub mod repos;
pub mod router;
pub mod sentry_integration;
pub mod services;
pub mod types;

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::process::exit;
use std::sync::Arc;

use failure::Error as FailureError;
use hyper::service::{make_service_fn, service_fn};
use hyper::Server;

use crate::config::Config;
use crate::controller::ControllerImpl;
use crate::http::Application;
use crate::models::OrderListFilter;
use crate::repos::{OrderRepo, OrderRepoImpl};
use crate::services::{ReportService, ReportServiceImpl};

pub fn start_server(config: Config) {
    let runtime = tokio::runtime::Runtime::new().expect("Unexpected error creating tokio runtime");

    runtime.block_on(async move {
        if let Err(e) = serve(config).await {
            error!("Http Server Initialization Error: {}", e);
            exit(1);
        }
    });
}

async fn serve(config: Config) -> Result<(), FailureError> {
    let db_pool = types::create_db_pool(&config.db).await?;
    migrations::run(&db_pool).await?;

    let repo: Arc<dyn OrderRepo> = Arc::new(OrderRepoImpl::new(db_pool));
    let app = Application::new(Arc::new(ControllerImpl::new(
        repo,
        config.pricing.clone(),
        config.inventory.clone(),
    )));

    let make_service = make_service_fn(move |_| {
        let app = app.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |request| {
                let app = app.clone();
                async move { Ok::<_, Infallible>(app.handle(request).await) }
            }))
        }
    });

    let addr = SocketAddr::new(config.listen.host, config.listen.port);
    let server = Server::try_bind(&addr)?.serve(make_service);
    info!("Listening on http://{}", addr);

    server.with_graceful_shutdown(shutdown_signal()).await?;
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
}

/// Prints the filtered order history as CSV to stdout.
pub fn start_orders_export(config: Config, params: HashMap<String, String>) {
    let runtime = tokio::runtime::Runtime::new().expect("Unexpected error creating tokio runtime");

    runtime.block_on(async move {
        match export_orders(config, params).await {
            Ok(csv) => print!("{}", csv),
            Err(e) => {
                error!("Orders export failed: {}", e);
                exit(1);
            }
        }
    });
}

async fn export_orders(config: Config, params: HashMap<String, String>) -> Result<String, FailureError> {
    let filter = OrderListFilter::from_query(&params)?;
    let db_pool = types::create_db_pool(&config.db).await?;

    let repo: Arc<dyn OrderRepo> = Arc::new(OrderRepoImpl::new(db_pool));
    ReportServiceImpl::new(repo, config.pricing).history_csv(filter).await
}

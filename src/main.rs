mod telemetry;

use creneau_api::Application;
use creneau_infra::{run_migration, setup_context};
use telemetry::{get_subscriber, init_subscriber};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    openssl_probe::init_ssl_cert_env_vars();

    let subscriber = get_subscriber("creneau_scheduler".into(), "info".into());
    init_subscriber(subscriber);

    if let Err(e) = run_migration().await {
        tracing::error!("Unable to run the database migrations: {:?}", e);
        return Err(std::io::Error::new(std::io::ErrorKind::Other, e));
    }
    let context = setup_context().await;

    let app = Application::new(context).await?;
    app.start().await
}

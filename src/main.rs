use color_eyre::eyre::{Context, bail};
use xades_signer::{
    config::Config,
    signing::SigningService,
    telemetry,
    xades::SigningAdapter,
};

const USAGE: &str = "usage: xades-signer <xml-file> [<certificate.p12> <password>]";

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    telemetry::init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let xml_path = match args.first() {
        Some(path) => path,
        None => bail!(USAGE),
    };

    let config = Config::load()?;
    if !config.signature.is_configured() {
        tracing::info!("No default certificate configured");
    } else if let Err(e) = config.signature.validate() {
        tracing::warn!("Default certificate configuration is invalid: {e}");
    }

    let xml_content = tokio::fs::read_to_string(xml_path)
        .await
        .wrap_err_with(|| format!("Failed to read {xml_path}"))?;
    let access_key = uuid::Uuid::new_v4().to_string();

    let service = SigningService::with_default(SigningAdapter::default(), config.signature);
    let result = match args.as_slice() {
        [_] => service.sign(&xml_content, &access_key).await,
        [_, certificate_path, password] => {
            service
                .sign_with_certificate(&xml_content, certificate_path, password, &access_key)
                .await
        }
        _ => bail!(USAGE),
    };

    println!("{}", serde_json::to_string_pretty(&result)?);
    if !result.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

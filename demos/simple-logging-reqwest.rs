#[tokio::main]
async fn main() {
    use loki_logger_rs::LokiLogger;
    use std::time::Duration;

    let my_loki = LokiLogger::builder("http://localhost:3100")
        .label("app", "simple-logging-reqwest")
        .timeout(Duration::from_secs(5))
        .build_async()
        .unwrap();

    if let Err(error) = my_loki.info("This is a INFO message", None, None).await {
        eprintln!("{}", error);
    }
    if let Err(error) = my_loki
        .custom_level("fatal", "This is a FATAL message", None, None)
        .await
    {
        eprintln!("{}", error);
    }
}

fn main() {
    use fern::Dispatch;
    use log::LevelFilter;
    use log::{debug, error, info, trace, warn};
    use loki_logger_rs::{Labels, LokiLogger};
    use serde_json::json;

    let build_logger = || {
        LokiLogger::builder("http://localhost:3100")
            .label("app", "simple-fern-logging")
            .build()
            .unwrap()
    };

    // one logger is handed to fern, a second one is kept for pushes whose outcome we care about
    let facade_loki = build_logger();
    let audit_loki = build_logger();

    let _ = Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                humantime::format_rfc3339(std::time::SystemTime::now()),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(LevelFilter::Debug)
        // the HTTP client logs every request it makes
        .level_for("ureq", LevelFilter::Off)
        .chain(std::io::stdout())
        .chain(Box::new(facade_loki) as Box<dyn log::Log>)
        .apply();

    // records below DEBUG are dropped by fern, failed pushes are reported via `log::error!`
    trace!("This is a TRACE message");
    debug!("This is a DEBUG message");
    info!("This is a INFO message");
    warn!("This is a WARN message");
    error!("This is a ERROR message");

    // a direct push carries its own labels and extras and reports failures to the caller
    let labels = Labels::from([("stream".to_string(), "audit".to_string())]);
    let extras = json!({"user_id": "123", "action": "login"});
    match audit_loki.custom_level("audit", "User logged in", extras.as_object(), Some(&labels)) {
        Ok(()) => info!("audit entry stored in Loki"),
        Err(error) => error!("audit entry was not stored: {}", error),
    }
}

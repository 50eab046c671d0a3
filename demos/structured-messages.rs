fn main() {
    use loki_logger_rs::{LokiLogger, Message};
    use serde_json::json;

    let my_loki = LokiLogger::builder("http://localhost:3100")
        .severity_label("log_level")
        .label("app", "structured-messages")
        .build()
        .unwrap();

    let message = Message::try_from(json!({"error": "Database error", "code": 500})).unwrap();
    let extras = json!({"code": 503, "db": "postgres"});

    // the extras win, so Loki receives {"code":503,"db":"postgres","error":"Database error"}
    if let Err(error) = my_loki.error(message, extras.as_object(), None) {
        eprintln!("{}", error);
    }
}

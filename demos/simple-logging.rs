fn main() {
    use loki_logger_rs::{AuthenticationMethod, Labels, LokiLogger};
    use serde_json::json;

    let my_loki = LokiLogger::builder("http://localhost:3100")
        .with_authentication(
            AuthenticationMethod::Basic,
            "example".to_string(),
            "password".to_string(),
        )
        .label("app", "simple-logging")
        .build()
        .unwrap();

    let labels = Labels::from([("component".to_string(), "startup".to_string())]);
    let extras = json!({"user_id": "123", "request_id": "abc-def"});

    // every call is exactly one push request, failures are returned to the caller
    for result in [
        my_loki.debug("This is a DEBUG message", None, None),
        my_loki.info("This is a INFO message", None, Some(&labels)),
        my_loki.warn("This is a WARN message", extras.as_object(), None),
        my_loki.error("This is a ERROR message", extras.as_object(), Some(&labels)),
        my_loki.custom_level("critical", "This is a CRITICAL message", None, None),
    ] {
        if let Err(error) = result {
            eprintln!("{}", error);
        }
    }
}

use ccx::cli::convert::ConvertOptions;
use ccx::core::{
    ConversionDisplay, ConversionError, ConversionRequest, ConversionWorkflow, CurrencySet, Phase,
    PresentationSink,
};
use ccx::providers::OpenErApiProvider;
use std::fs;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{error, info};

// Adds automatic logging to test
mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const USD_RATES: &str = r#"{
        "result": "success",
        "base_code": "USD",
        "rates": { "USD": 1, "EUR": 0.9214, "INR": 83.1234 }
    }"#;

    pub const INR_RATES: &str = r#"{
        "result": "success",
        "base_code": "INR",
        "rates": { "INR": 1, "USD": 0.012, "EUR": 0.0111 }
    }"#;

    pub async fn mount_rates(server: &MockServer, base: &str, status: u16, body: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/v6/latest/{base}")))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(server)
            .await;
    }

    pub fn write_config(base_url: &str, extra: &str) -> tempfile::NamedTempFile {
        let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        let config_content = format!(
            r#"
defaults:
  from: "USD"
  to: "INR"
providers:
  open_er_api:
    base_url: {base_url}
    timeout_ms: 5000
{extra}
"#
        );
        std::fs::write(config_file.path(), config_content).expect("Failed to write config file");
        config_file
    }
}

#[derive(Default)]
struct RecordingSink {
    busy: Mutex<Vec<bool>>,
    shown: Mutex<Vec<ConversionDisplay>>,
    notices: Mutex<Vec<String>>,
}

impl PresentationSink for RecordingSink {
    fn set_busy(&self, busy: bool) {
        self.busy.lock().unwrap().push(busy);
    }

    fn show_conversion(&self, display: &ConversionDisplay) {
        self.shown.lock().unwrap().push(display.clone());
    }

    fn notify(&self, message: &str) {
        self.notices.lock().unwrap().push(message.to_string());
    }
}

fn options(amount: &str, from: &str, to: &str, swap: bool) -> ConvertOptions {
    ConvertOptions {
        amount: Some(amount.to_string()),
        from: Some(from.to_string()),
        to: Some(to.to_string()),
        swap,
    }
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_mock() {
    let mock_server = wiremock::MockServer::start().await;
    test_utils::mount_rates(&mock_server, "USD", 200, test_utils::USD_RATES).await;
    let config_file = test_utils::write_config(&mock_server.uri(), "");

    let result = ccx::run_command(
        ccx::AppCommand::Convert(options("100", "USD", "INR", false)),
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(
        result.is_ok(),
        "Convert command failed with: {:?}",
        result.err()
    );
}

#[test_log::test(tokio::test)]
async fn test_swap_flag_requests_reverse_pair() {
    let mock_server = wiremock::MockServer::start().await;
    test_utils::mount_rates(&mock_server, "INR", 200, test_utils::INR_RATES).await;
    let config_file = test_utils::write_config(&mock_server.uri(), "");

    let result = ccx::run_command(
        ccx::AppCommand::Convert(options("500", "USD", "INR", true)),
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(result.is_ok(), "Swap failed with: {:?}", result.err());

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.path(), "/v6/latest/INR");
}

#[test_log::test(tokio::test)]
async fn test_app_flow_reports_unavailable_rate() {
    let mock_server = wiremock::MockServer::start().await;
    test_utils::mount_rates(&mock_server, "USD", 500, "").await;
    let config_file = test_utils::write_config(&mock_server.uri(), "");

    let result = ccx::run_command(
        ccx::AppCommand::Convert(options("10", "USD", "INR", false)),
        Some(config_file.path().to_str().unwrap()),
    )
    .await;

    let err = result.expect_err("conversion should fail");
    assert!(
        matches!(
            err.downcast_ref::<ConversionError>(),
            Some(ConversionError::RateUnavailable { .. })
        ),
        "unexpected error: {err:#}"
    );
    assert!(err.to_string().contains("HTTP error: 500"));
}

#[test_log::test(tokio::test)]
async fn test_unknown_currency_is_rejected_before_fetch() {
    let mock_server = wiremock::MockServer::start().await;
    let config_file = test_utils::write_config(&mock_server.uri(), "");

    let result = ccx::run_command(
        ccx::AppCommand::Convert(options("10", "USD", "QQQ", false)),
        Some(config_file.path().to_str().unwrap()),
    )
    .await;

    assert_eq!(
        result.unwrap_err().to_string(),
        "Unknown currency code: QQQ"
    );
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[test_log::test(tokio::test)]
async fn test_currencies_command_with_custom_table() {
    let table_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    fs::write(
        table_file.path(),
        "currencies:\n  USD: { country: US, name: \"US Dollar\" }\n  INR: { country: IN }\n",
    )
    .expect("Failed to write currency table");

    let extra = format!("currency_table: {}", table_file.path().display());
    let config_file = test_utils::write_config("http://127.0.0.1:9", &extra);

    let result = ccx::run_command(
        ccx::AppCommand::Currencies,
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(result.is_ok(), "Currencies failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_missing_config_file_fails() {
    let result = ccx::run_command(
        ccx::AppCommand::Currencies,
        Some("/nonexistent/ccx/config.yaml"),
    )
    .await;
    assert!(
        result
            .unwrap_err()
            .to_string()
            .contains("Failed to read config file")
    );
}

#[test_log::test(tokio::test)]
async fn test_workflow_over_http() {
    let mock_server = wiremock::MockServer::start().await;
    test_utils::mount_rates(&mock_server, "USD", 200, test_utils::USD_RATES).await;
    test_utils::mount_rates(&mock_server, "INR", 200, test_utils::INR_RATES).await;
    test_utils::mount_rates(
        &mock_server,
        "EUR",
        200,
        r#"{"result": "error", "error-type": "quota-reached"}"#,
    )
    .await;

    let currencies = CurrencySet::builtin().unwrap();
    let provider = OpenErApiProvider::new(&mock_server.uri(), Duration::from_secs(5)).unwrap();
    let sink = Arc::new(RecordingSink::default());
    let workflow = ConversionWorkflow::new(Arc::new(provider), sink.clone());

    let request = ConversionRequest::from_input("100", "USD", "INR", &currencies).unwrap();
    workflow.convert(&request).await.unwrap();
    let shown = workflow.state().displayed.unwrap();
    assert_eq!(shown.rate_text, "83.1234 INR");
    assert_eq!(shown.result_text, "100 USD = 8312.34 INR");

    let (swapped, outcome) = workflow.swap(&request).await;
    assert_eq!(swapped.source.as_str(), "INR");
    outcome.unwrap();
    let shown = workflow.state().displayed.unwrap();
    assert_eq!(shown.rate_text, "0.0120 USD");
    assert_eq!(shown.result_text, "100 INR = 1.20 USD");

    let failing = ConversionRequest::from_input("", "EUR", "USD", &currencies).unwrap();
    let err = workflow.convert(&failing).await.unwrap_err();
    assert!(err.to_string().contains("quota-reached"));
    assert_eq!(workflow.phase(), Phase::Error);
    assert_eq!(workflow.state().displayed.unwrap(), shown);

    assert_eq!(
        *sink.notices.lock().unwrap(),
        vec!["Failed to get exchange rate. Try again later."]
    );
    assert_eq!(sink.shown.lock().unwrap().len(), 2);
    assert_eq!(
        *sink.busy.lock().unwrap(),
        vec![true, false, true, false, true, false]
    );
}

#[test_log::test(tokio::test)]
#[ignore = "calls the live exchange rate service"]
async fn test_real_open_er_api() {
    use ccx::core::RateProvider;

    let currencies = CurrencySet::builtin().unwrap();
    let provider =
        OpenErApiProvider::new("https://open.er-api.com", Duration::from_secs(10)).unwrap();

    let from = currencies.resolve("USD").unwrap();
    let to = currencies.resolve("EUR").unwrap();
    info!(%from, %to, "Fetching exchange rate from open.er-api.com");

    match provider.lookup(&from, &to).await {
        Ok(rate) => {
            info!(%rate, "Received successful rate response");
            assert!(rate > rust_decimal::Decimal::ZERO, "Rate should be positive");
        }
        Err(e) => {
            error!("Rate API request failed: {e}\n{e:?}");
            panic!("Rate API request failed: {e}");
        }
    }
}

//! End-to-end tests against a mock gateway
//!
//! Runs the real reqwest transport against a local wiremock server standing
//! in for the Rave sandbox.

#[cfg(feature = "http")]
mod gateway_tests {
    use rave_gateway::{
        AuthMethod, Instrument, PaymentDetails, RaveClient, RaveConfig, RaveError,
        TransactionOutcome,
    };
    use serde_json::{json, Value};
    use wiremock::matchers::{body_json, body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PUBLIC_KEY: &str = "FLWPUBK-7adb6177bd71dd43c2efa3f1229e3b7f-X";
    const SECRET_KEY: &str = "FLWSECK-e6db11d1f8a6208de8cb2f94e293450e-X";
    const CHARGE_PATH: &str = "/flwv3-pug/getpaidx/api/charge";

    fn client_for(server: &MockServer) -> RaveClient {
        let mut config = RaveConfig::new(PUBLIC_KEY, SECRET_KEY);
        config.base_url = Some(server.uri());
        config.timeout_secs = 5;
        RaveClient::new(config).expect("client should build")
    }

    fn details(value: Value) -> PaymentDetails {
        value.as_object().cloned().expect("object literal")
    }

    fn card_details() -> PaymentDetails {
        details(json!({
            "cardno": "5438898014560229",
            "cvv": "890",
            "expirymonth": "09",
            "expiryyear": "19",
            "amount": "10",
            "email": "user@example.com",
            "phonenumber": "0902620185",
            "firstname": "temi",
            "lastname": "desola",
            "IP": "355426087298442",
        }))
    }

    async fn mount_charge(server: &MockServer, status: u16, body: Value) {
        Mock::given(method("POST"))
            .and(path(CHARGE_PATH))
            .and(body_partial_json(json!({"PBFPubKey": PUBLIC_KEY, "alg": "3DES-24"})))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_card_charge_complete() {
        let server = MockServer::start().await;
        mount_charge(
            &server,
            200,
            json!({"status": "success", "data": {"chargeResponseCode": "00"}}),
        )
        .await;

        let result = client_for(&server)
            .charge(Instrument::Card, &card_details(), false)
            .await
            .unwrap();

        assert_eq!(result.outcome, TransactionOutcome::Complete);
    }

    #[tokio::test]
    async fn test_card_charge_requires_pin() {
        let server = MockServer::start().await;
        mount_charge(
            &server,
            200,
            json!({"status": "success", "data": {"chargeResponseCode": "02", "suggested_auth": "PIN"}}),
        )
        .await;

        let result = client_for(&server)
            .charge(Instrument::Card, &card_details(), false)
            .await
            .unwrap();

        assert!(result.outcome.requires_validation());
        assert_eq!(result.outcome.auth_method(), Some(&AuthMethod::Pin));
        assert_eq!(result.outcome.auth_method().unwrap().as_str(), "PIN");
    }

    #[tokio::test]
    async fn test_validate_invalid_otp_is_validation_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/flwv3-pug/getpaidx/api/validatecharge"))
            .and(body_json(json!({
                "PBFPubKey": PUBLIC_KEY,
                "transactionreference": "FLW-123",
                "transaction_reference": "FLW-123",
                "otp": "00000",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "data": {"tx": {"chargeResponseCode": "02", "chargeResponseMessage": "Invalid OTP"}}
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .validate(Instrument::Card, "FLW-123", "00000")
            .await
            .unwrap_err();

        assert!(matches!(err, RaveError::Validation(_)));
        assert_eq!(err.gateway_message(), Some("Invalid OTP"));
        assert_eq!(err.flw_ref(), Some("FLW-123"));
    }

    #[tokio::test]
    async fn test_gateway_error_message_passed_through() {
        let server = MockServer::start().await;
        mount_charge(
            &server,
            400,
            json!({"status": "error", "message": "INVALID ACCOUNT NUMBER", "data": {}}),
        )
        .await;

        let account = details(json!({
            "accountbank": "044",
            "accountnumber": "0690000031",
            "amount": "100",
            "email": "user@example.com",
            "phonenumber": "0902620185",
            "IP": "355426087298442",
        }));

        let err = client_for(&server)
            .charge(Instrument::Account, &account, false)
            .await
            .unwrap_err();

        match &err {
            RaveError::Charge { instrument, failure } => {
                assert_eq!(*instrument, Some(Instrument::Account));
                assert_eq!(failure.message, "INVALID ACCOUNT NUMBER");
                assert!(failure.tx_ref.is_some());
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_html_error_page_is_protocol_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(CHARGE_PATH))
            .respond_with(ResponseTemplate::new(503).set_body_string("<html>down</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .charge(Instrument::Card, &card_details(), false)
            .await
            .unwrap_err();

        assert!(matches!(err, RaveError::GatewayProtocol { status: 503, .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_retry_after_failure_adds_polling_hint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(CHARGE_PATH))
            .and(query_param("use_polling", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "data": {"chargeResponseCode": "00", "flwRef": "FLW-POLL"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut mpesa = details(json!({
            "amount": "30",
            "email": "user@example.com",
            "phonenumber": "0926420185",
            "IP": "40.198.14",
        }));
        mpesa.insert("txRef".to_string(), json!("MC-timeout-1"));

        let result = client_for(&server)
            .charge(Instrument::Mpesa, &mpesa, true)
            .await
            .unwrap();

        assert_eq!(result.tx_ref, "MC-timeout-1");
        assert_eq!(result.flw_ref.as_deref(), Some("FLW-POLL"));
        assert_eq!(result.request["currency"], json!("KES"));
        assert_eq!(result.request["is_mpesa"], json!("1"));
    }

    #[tokio::test]
    async fn test_ussd_gtbank_instructions() {
        let server = MockServer::start().await;
        mount_charge(
            &server,
            200,
            json!({"status": "success", "data": {"chargeResponseCode": "02", "flwRef": "FLW-U"}}),
        )
        .await;

        let ussd = details(json!({
            "accountbank": "058",
            "accountnumber": "0690000031",
            "amount": "100",
            "email": "user@example.com",
            "phonenumber": "0902620185",
            "IP": "355426087298442",
        }));

        let result = client_for(&server)
            .charge(Instrument::Ussd, &ussd, false)
            .await
            .unwrap();

        match result.outcome {
            TransactionOutcome::ValidationRequired { instructions, .. } => assert_eq!(
                instructions.as_deref(),
                Some("To complete this transaction, please dial *737*50*charged_amount*159#")
            ),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(result.request["is_ussd"], json!("1"));
        assert!(result.request.contains_key("orderRef"));
    }

    #[tokio::test]
    async fn test_preauth_capture_then_refund() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/flwv3-pug/getpaidx/api/capture"))
            .and(body_json(json!({"SECKEY": SECRET_KEY, "flwRef": "FLW-PRE"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "data": {"chargeResponseCode": "00", "flwRef": "FLW-PRE"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/flwv3-pug/getpaidx/api/refundorvoid"))
            .and(body_partial_json(json!({"action": "refund", "amount": "5"})))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "status": "error",
                "message": "Amount exceeds captured amount"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let captured = client.capture("FLW-PRE").await.unwrap();
        assert!(captured.outcome.is_complete());

        let err = client.refund("FLW-PRE", Some("5")).await.unwrap_err();
        assert!(matches!(err, RaveError::RefundVoid(_)));
        assert_eq!(err.gateway_message(), Some("Amount exceeds captured amount"));
        assert_eq!(err.flw_ref(), Some("FLW-PRE"));
    }

    #[tokio::test]
    async fn test_verify_incomplete_transaction() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/flwv3-pug/getpaidx/api/v2/verify"))
            .and(body_json(json!({"txref": "MC-1", "SECKEY": SECRET_KEY})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "data": {"chargecode": "02", "status": "failed", "txref": "MC-1"}
            })))
            .mount(&server)
            .await;

        let result = client_for(&server).verify("MC-1").await.unwrap();
        assert!(!result.is_complete());
        assert_eq!(
            result.outcome,
            TransactionOutcome::Failed {
                reason: "failed".to_string()
            }
        );
        assert_eq!(result.card_token, None);
    }

    #[tokio::test]
    async fn test_concurrent_charges_get_distinct_references() {
        let server = MockServer::start().await;
        mount_charge(
            &server,
            200,
            json!({"status": "success", "data": {"chargeResponseCode": "00"}}),
        )
        .await;

        let client = client_for(&server);
        let card = card_details();
        let (a, b) = tokio::join!(
            client.charge(Instrument::Card, &card, false),
            client.charge(Instrument::Card, &card, false)
        );

        assert_ne!(a.unwrap().tx_ref, b.unwrap().tx_ref);
        assert!(!card.contains_key("txRef"));
    }
}

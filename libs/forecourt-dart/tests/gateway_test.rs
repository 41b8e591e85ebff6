//! End-to-end gateway tests against a scripted bus.

mod common;

use std::collections::HashMap;

use common::{body_of, fast_config, gateway_with, reply_frame, status_reply};
use forecourt_dart::{LinkError, PumpStatus};

// ============================================================================
// Query Tests
// ============================================================================

#[tokio::test]
async fn test_query_status_decodes_reply() {
    let (gateway, script) = gateway_with(fast_config(), vec![status_reply(0x51, 0x01)]);

    let telemetry = gateway.query_status(1).await.unwrap();
    assert_eq!(telemetry.status, Some(PumpStatus::Reset));

    // One status-request record on the wire
    assert_eq!(script.write_count(), 1);
    assert_eq!(body_of(&script.written(0)), vec![0x01, 0x01, 0x00]);
}

#[tokio::test]
async fn test_query_fill_info_decodes_quantities() {
    let mut body = vec![0x02, 0x08, 0x00, 0x01, 0x23, 0x45, 0x00, 0x06, 0x78, 0x90];
    body.extend_from_slice(&[0x03, 0x01, 0x12]);
    let (gateway, script) = gateway_with(fast_config(), vec![reply_frame(0x51, &body)]);

    let telemetry = gateway.query_fill_info(1).await.unwrap();
    assert!((telemetry.volume.unwrap() - 123.45).abs() < 1e-9);
    assert!((telemetry.amount.unwrap() - 678.90).abs() < 1e-9);
    assert_eq!(telemetry.nozzle, Some(2));
    assert_eq!(telemetry.nozzle_out, Some(true));

    assert_eq!(body_of(&script.written(0)), vec![0x01, 0x01, 0x04]);
}

#[tokio::test]
async fn test_query_addresses_the_configured_base() {
    let (gateway, script) = gateway_with(fast_config(), vec![status_reply(0x53, 0x01)]);

    gateway.query_status(3).await.unwrap();
    assert_eq!(script.written(0)[0], 0x53);
}

// ============================================================================
// Authorize Tests
// ============================================================================

#[tokio::test]
async fn test_authorize_with_volume_preset() {
    let replies = vec![reply_frame(0x51, &[]), status_reply(0x51, 0x02)];
    let (gateway, script) = gateway_with(fast_config(), replies);

    let telemetry = gateway.authorize(1, Some(10.0), None).await.unwrap();
    assert_eq!(telemetry.status, Some(PumpStatus::Authorized));

    // Preset volume 10.00 as 4-byte BCD, then the authorize command
    assert_eq!(script.write_count(), 2);
    assert_eq!(
        body_of(&script.written(0)),
        vec![0x03, 0x04, 0x00, 0x00, 0x10, 0x00]
    );
    assert_eq!(body_of(&script.written(1)), vec![0x01, 0x01, 0x06]);
}

#[tokio::test]
async fn test_authorize_with_amount_preset() {
    let replies = vec![reply_frame(0x51, &[]), status_reply(0x51, 0x02)];
    let (gateway, script) = gateway_with(fast_config(), replies);

    gateway.authorize(1, None, Some(500.0)).await.unwrap();
    assert_eq!(
        body_of(&script.written(0)),
        vec![0x04, 0x04, 0x00, 0x05, 0x00, 0x00]
    );
}

#[tokio::test]
async fn test_authorize_without_preset() {
    let (gateway, script) = gateway_with(fast_config(), vec![status_reply(0x51, 0x02)]);

    gateway.authorize(1, None, None).await.unwrap();
    assert_eq!(script.write_count(), 1);
    assert_eq!(body_of(&script.written(0)), vec![0x01, 0x01, 0x06]);
}

#[tokio::test]
async fn test_authorize_rejects_both_presets_before_io() {
    let (gateway, script) = gateway_with(fast_config(), vec![]);

    let err = gateway.authorize(1, Some(10.0), Some(500.0)).await.unwrap_err();
    assert!(matches!(err, LinkError::InvalidInput(_)));
    assert_eq!(script.write_count(), 0);
}

#[tokio::test]
async fn test_authorize_rejects_non_positive_preset_before_io() {
    let (gateway, script) = gateway_with(fast_config(), vec![]);

    for (volume, amount) in [(Some(0.0), None), (Some(-1.0), None), (None, Some(-2.5))] {
        let err = gateway.authorize(1, volume, amount).await.unwrap_err();
        assert!(matches!(err, LinkError::InvalidInput(_)));
    }
    assert_eq!(script.write_count(), 0);
}

// ============================================================================
// Command Tests
// ============================================================================

#[tokio::test]
async fn test_stop_reset_switch_off_codes() {
    let replies = vec![
        status_reply(0x51, 0x05),
        status_reply(0x51, 0x01),
        status_reply(0x51, 0x07),
    ];
    let (gateway, script) = gateway_with(fast_config(), replies);

    gateway.stop(1).await.unwrap();
    gateway.reset(1).await.unwrap();
    gateway.switch_off(1).await.unwrap();

    assert_eq!(body_of(&script.written(0)), vec![0x01, 0x01, 0x08]);
    assert_eq!(body_of(&script.written(1)), vec![0x01, 0x01, 0x05]);
    assert_eq!(body_of(&script.written(2)), vec![0x01, 0x01, 0x0A]);
}

#[tokio::test]
async fn test_suspend_sends_nozzle_then_queries_status() {
    let replies = vec![reply_frame(0x51, &[]), status_reply(0x51, 0x08)];
    let (gateway, script) = gateway_with(fast_config(), replies);

    let telemetry = gateway.suspend(1, 2).await.unwrap();
    assert_eq!(telemetry.status, Some(PumpStatus::Suspended));

    assert_eq!(body_of(&script.written(0)), vec![0x0E, 0x01, 0x02]);
    assert_eq!(body_of(&script.written(1)), vec![0x01, 0x01, 0x00]);
}

#[tokio::test]
async fn test_resume_whole_pump() {
    let replies = vec![reply_frame(0x51, &[]), status_reply(0x51, 0x04)];
    let (gateway, script) = gateway_with(fast_config(), replies);

    gateway.resume(1, 0).await.unwrap();
    assert_eq!(body_of(&script.written(0)), vec![0x0F, 0x01, 0x00]);
}

#[tokio::test]
async fn test_suspend_rejects_out_of_range_nozzle() {
    let (gateway, script) = gateway_with(fast_config(), vec![]);

    let err = gateway.suspend(1, 17).await.unwrap_err();
    assert!(matches!(err, LinkError::InvalidInput(_)));
    assert_eq!(script.write_count(), 0);
}

// ============================================================================
// Price Table Tests
// ============================================================================

#[tokio::test]
async fn test_update_price_builds_fixed_table() {
    let config = forecourt_dart::DartConfig {
        nozzle_count: 2,
        ..fast_config()
    };
    let replies = vec![reply_frame(0x51, &[]), status_reply(0x51, 0x01)];
    let (gateway, script) = gateway_with(config, replies);

    let mut prices = HashMap::new();
    prices.insert(1, 52.50);
    let telemetry = gateway.update_price(1, &prices).await.unwrap();
    assert_eq!(telemetry.status, Some(PumpStatus::Reset));

    // Nozzle 1 priced 52.50, nozzle 2 unlisted and priced zero, fixed order
    assert_eq!(
        body_of(&script.written(0)),
        vec![0x05, 0x06, 0x05, 0x25, 0x00, 0x00, 0x00, 0x00]
    );
}

#[tokio::test]
async fn test_update_price_rejects_bad_input_before_io() {
    let config = forecourt_dart::DartConfig {
        nozzle_count: 2,
        ..fast_config()
    };
    let (gateway, script) = gateway_with(config, vec![]);

    let mut out_of_range = HashMap::new();
    out_of_range.insert(3u8, 50.0);
    assert!(matches!(
        gateway.update_price(1, &out_of_range).await.unwrap_err(),
        LinkError::InvalidInput(_)
    ));

    let mut non_positive = HashMap::new();
    non_positive.insert(1u8, 0.0);
    assert!(matches!(
        gateway.update_price(1, &non_positive).await.unwrap_err(),
        LinkError::InvalidInput(_)
    ));

    assert_eq!(script.write_count(), 0);
}

// ============================================================================
// Nozzle Restriction Tests
// ============================================================================

#[tokio::test]
async fn test_allow_nozzles_lists_permitted_numbers() {
    let replies = vec![reply_frame(0x51, &[]), status_reply(0x51, 0x01)];
    let (gateway, script) = gateway_with(fast_config(), replies);

    gateway.allow_nozzles(1, &[1, 3, 5]).await.unwrap();
    assert_eq!(body_of(&script.written(0)), vec![0x02, 0x03, 0x01, 0x03, 0x05]);
}

#[tokio::test]
async fn test_allow_nozzles_rejects_bad_input_before_io() {
    let (gateway, script) = gateway_with(fast_config(), vec![]);

    assert!(matches!(
        gateway.allow_nozzles(1, &[]).await.unwrap_err(),
        LinkError::InvalidInput(_)
    ));
    assert!(matches!(
        gateway.allow_nozzles(1, &[1, 17]).await.unwrap_err(),
        LinkError::InvalidInput(_)
    ));
    assert_eq!(script.write_count(), 0);
}

// ============================================================================
// Failure Surface Tests
// ============================================================================

#[tokio::test]
async fn test_silent_pump_reports_no_response_after_three_writes() {
    let (gateway, script) = gateway_with(fast_config(), vec![]);

    let err = gateway.query_status(1).await.unwrap_err();
    assert!(matches!(err, LinkError::NoResponse));
    assert_eq!(script.write_count(), 3);
}

#[tokio::test]
async fn test_empty_reply_reports_no_telemetry() {
    let (gateway, _script) = gateway_with(fast_config(), vec![reply_frame(0x51, &[])]);

    let err = gateway.query_status(1).await.unwrap_err();
    assert!(matches!(err, LinkError::NoTelemetry));
}

#[tokio::test]
async fn test_pump_id_outside_span_rejected_before_io() {
    let (gateway, script) = gateway_with(fast_config(), vec![]);

    let err = gateway.query_status(9).await.unwrap_err();
    assert!(matches!(err, LinkError::InvalidInput(_)));
    assert_eq!(script.write_count(), 0);
}

// ============================================================================
// Sequence Toggle Tests
// ============================================================================

#[tokio::test]
async fn test_consecutive_calls_alternate_sequence_bit() {
    let replies = vec![
        status_reply(0x51, 0x01),
        status_reply(0x51, 0x01),
        status_reply(0x51, 0x01),
        status_reply(0x51, 0x01),
    ];
    let (gateway, script) = gateway_with(fast_config(), replies);

    for _ in 0..4 {
        gateway.query_status(1).await.unwrap();
    }

    let bits: Vec<u8> = (0..4).map(|i| script.written(i)[1] & 0x01).collect();
    assert_eq!(bits, vec![0, 1, 0, 1]);
}

// ============================================================================
// Scan Tests
// ============================================================================

#[tokio::test]
async fn test_scan_records_every_outcome() {
    let config = forecourt_dart::DartConfig {
        first_pump: 1,
        last_pump: 2,
        ..fast_config()
    };
    // Pump 1 answers; pump 2 stays silent
    let (gateway, _script) = gateway_with(config, vec![status_reply(0x51, 0x04)]);

    let results = gateway.scan().await;
    assert_eq!(results.len(), 2);

    assert_eq!(results[0].0, 1);
    assert_eq!(
        results[0].1.as_ref().unwrap().status,
        Some(PumpStatus::Filling)
    );

    assert_eq!(results[1].0, 2);
    assert!(matches!(
        results[1].1.as_ref().unwrap_err(),
        LinkError::NoResponse
    ));
}

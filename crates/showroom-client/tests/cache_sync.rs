//! Cache behavior against a mock backend: coalescing, tag invalidation,
//! error states and the dashboard memo.

mod common;

use chrono::{FixedOffset, TimeZone};
use common::*;
use serde_json::json;
use showroom_client::{ApiError, CacheKey, EntryStatus, Freshness};
use showroom_core::filters::{SalesFilter, VehicleStockFilter};
use showroom_core::{PaymentMode, SaleDraft};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header_exists, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn concurrent_identical_reads_issue_one_request() {
    let h = Harness::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("branches")))
        .and(header_exists("x-request-id"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([branch(1, "Andheri", "Mumbai")]))
                .set_delay(Duration::from_millis(150)),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    let (a, b, c) = tokio::join!(h.api().branches(), h.api().branches(), h.api().branches());
    let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());

    assert!(Arc::ptr_eq(&a, &b));
    assert!(Arc::ptr_eq(&b, &c));
    assert_eq!(a[0].name, "Andheri");

    let stats = h.ctx.cache.stats().await;
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.coalesced, 2);
}

#[tokio::test]
async fn different_params_are_different_entries() {
    let h = Harness::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("vehicle-stock")))
        .and(query_param("city", "Pune"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([stock(1, 2, 0, "Baner")])))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path(api_path("vehicle-stock")))
        .and(query_param("in_stock_only", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&h.server)
        .await;

    let pune = VehicleStockFilter {
        city: Some("Pune".to_string()),
        ..Default::default()
    };
    let in_stock = VehicleStockFilter {
        in_stock_only: true,
        ..Default::default()
    };

    assert_eq!(h.api().vehicle_stock(&pune).await.unwrap().len(), 1);
    assert_eq!(h.api().vehicle_stock(&in_stock).await.unwrap().len(), 0);
    // Served from cache.
    assert_eq!(h.api().vehicle_stock(&pune).await.unwrap().len(), 1);
}

#[tokio::test]
async fn mutation_refetches_only_tagged_reads() {
    let h = Harness::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("vehicle-stock")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([stock(5, 4, 1, "Andheri")])))
        .expect(2)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path(api_path("branches")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([branch(1, "Andheri", "Mumbai")])))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path(api_path("vehicle-stock/5/adjust")))
        .respond_with(ResponseTemplate::new(200).set_body_json(stock(5, 6, 1, "Andheri")))
        .expect(1)
        .mount(&h.server)
        .await;

    let filter = VehicleStockFilter::default();
    h.api().vehicle_stock(&filter).await.unwrap();
    h.api().branches().await.unwrap();

    let adjusted = h.api().adjust_vehicle_stock(5, 2).await.unwrap();
    assert_eq!(adjusted.quantity, 6);

    let stock_key = CacheKey::bare("vehicle-stock");
    let branch_key = CacheKey::bare("branches");
    assert_eq!(h.ctx.cache.entry_status(&stock_key).await, EntryStatus::Stale);
    assert_eq!(h.ctx.cache.entry_status(&branch_key).await, EntryStatus::Ready);

    h.api().vehicle_stock(&filter).await.unwrap();
    h.api().branches().await.unwrap();
    assert_eq!(h.ctx.cache.entry_status(&stock_key).await, EntryStatus::Ready);
}

#[tokio::test]
async fn sale_capture_invalidates_stock_sales_and_customers() {
    let h = Harness::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("sales-records")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path(api_path("customers")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([customer(1, "Ravi")])))
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path(api_path("imports/jobs")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path(api_path("sales-records")))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(sale(9, "85000.00", true, "2024-03-05T10:00:00")),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    h.api().sales_records(&SalesFilter::default()).await.unwrap();
    h.api().customers(&Default::default()).await.unwrap();
    h.api().import_jobs().await.unwrap();

    let draft = SaleDraft {
        customer_id: Some(1),
        customer_name: None,
        customer_phone: None,
        customer_location: None,
        vehicle_stock_id: 1,
        payment_mode: PaymentMode::Cash,
        bank: None,
        payment_date: Some("2024-03-05".to_string()),
        amount_received: "85000.00".to_string(),
        is_payment_received: true,
    };
    let created = h.api().create_sale(&draft).await.unwrap();
    assert_eq!(created.id, 9);

    let cache = &h.ctx.cache;
    assert_eq!(cache.entry_status(&CacheKey::bare("sales-records")).await, EntryStatus::Stale);
    assert_eq!(cache.entry_status(&CacheKey::bare("customers")).await, EntryStatus::Stale);
    assert_eq!(cache.entry_status(&CacheKey::bare("imports/jobs")).await, EntryStatus::Ready);
}

#[tokio::test]
async fn failed_read_surfaces_http_error_and_retries_on_next_access() {
    let h = Harness::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("anomalies/open")))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path(api_path("anomalies/open")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&h.server)
        .await;

    let err = h.api().open_anomalies().await.unwrap_err();
    assert!(matches!(err, ApiError::Http { status: 503, .. }));
    let key = CacheKey::bare("anomalies/open");
    assert_eq!(h.ctx.cache.entry_status(&key).await, EntryStatus::Error);

    assert!(h.api().open_anomalies().await.unwrap().is_empty());
    assert_eq!(h.ctx.cache.entry_status(&key).await, EntryStatus::Ready);
}

#[tokio::test]
async fn structured_422_becomes_validation_error() {
    let h = Harness::start().await;
    Mock::given(method("POST"))
        .and(path(api_path("customers")))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "detail": [{ "loc": ["body", "phone"], "msg": "invalid phone number", "type": "value_error" }]
        })))
        .mount(&h.server)
        .await;

    let draft = showroom_core::CustomerDraft {
        name: "Meera".to_string(),
        phone: Some("12".to_string()),
        ..Default::default()
    };
    match h.api().create_customer(&draft).await {
        Err(ApiError::Validation { status, fields }) => {
            assert_eq!(status, 422);
            assert_eq!(fields[0].field(), "phone");
        }
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let config = showroom_client::ClientConfig::for_base_url(format!("http://127.0.0.1:{}/api/v1", port));
    let ctx = showroom_client::AppContext::with_storage(
        config,
        Arc::new(showroom_client::MemoryStorage::new()),
    )
    .unwrap();

    let err = ctx.api.branches().await.unwrap_err();
    assert!(err.is_retryable(), "expected a network error, got {:?}", err);
}

#[tokio::test]
async fn stale_while_revalidate_serves_previous_list() {
    let h = Harness::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("transfers/open")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .up_to_n_times(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path(api_path("transfers/open")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{
                    "id": 3, "from_branch_id": 1, "to_branch_id": 2, "model_id": 7, "quantity": 1,
                    "status": "requested", "requested_at": "2024-03-01T10:00:00",
                    "created_at": "2024-03-01T10:00:00", "updated_at": "2024-03-01T10:00:00"
                }]))
                .set_delay(Duration::from_millis(100)),
        )
        .mount(&h.server)
        .await;

    let api = h.api().clone().with_freshness(Freshness::StaleWhileRevalidate);
    assert!(api.open_transfers().await.unwrap().is_empty());

    h.ctx.cache.invalidate_tags(&[showroom_client::Tag::Transfers]).await;
    // Previous value comes back at once.
    assert!(api.open_transfers().await.unwrap().is_empty());

    let key = CacheKey::bare("transfers/open");
    for _ in 0..100 {
        if h.ctx.cache.entry_status(&key).await == EntryStatus::Ready {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(api.open_transfers().await.unwrap().len(), 1);
}

#[tokio::test]
async fn dashboard_is_memoized_until_inputs_refetch() {
    let h = Harness::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("vehicle-stock")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            stock(1, 10, 3, "Andheri"),
            stock(2, 5, 5, "Baner")
        ])))
        .expect(2)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path(api_path("sales-records")))
        .and(query_param("limit", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            sale(1, "1000.50", true, "2024-03-04T10:00:00"),
            sale(2, "abc", false, "2024-02-10T10:00:00")
        ])))
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path(api_path("branches")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            branch(1, "Andheri", "Mumbai"),
            branch(2, "Baner", "Pune")
        ])))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(api_path("vehicle-stock/2")))
        .respond_with(ResponseTemplate::new(204))
        .mount(&h.server)
        .await;

    let ist = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
    let now = ist.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();

    let first = h.api().dashboard(now).await.unwrap();
    assert_eq!(first.total_stock, 15);
    assert_eq!(first.reserved_units, 8);
    assert_eq!(first.available_stock, 7);
    assert_eq!(first.total_revenue.paise(), 100_050);
    assert_eq!(first.received_count, 1);
    assert_eq!(first.pending_payments, 1);

    let second = h.api().dashboard(now).await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(h.api().dashboard_computations().await, 1);

    h.api().delete_vehicle_stock(2).await.unwrap();
    h.api().dashboard(now).await.unwrap();
    assert_eq!(h.api().dashboard_computations().await, 2);
}

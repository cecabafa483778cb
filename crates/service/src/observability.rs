use once_cell::sync::Lazy;
use prometheus::{register_histogram, register_int_counter, Encoder, Histogram, IntCounter, TextEncoder};

// Prometheus metrics (default registry)
pub static ASSOCIATIONS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "competency_tracker_associations_total",
        "Total association records written"
    )
    .expect("register associations_total")
});

pub static IDS_MINTED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "competency_tracker_ids_minted_total",
        "Total fresh identifiers allocated"
    )
    .expect("register ids_minted_total")
});

pub static ID_COLLISIONS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "competency_tracker_id_collisions_total",
        "Total candidate identifiers rejected because they were occupied"
    )
    .expect("register id_collisions_total")
});

pub static NAME_CLAIM_CONFLICTS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "competency_tracker_name_claim_conflicts_total",
        "Total name claims lost to a concurrent writer"
    )
    .expect("register name_claim_conflicts_total")
});

pub static ID_SPACE_EXHAUSTED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "competency_tracker_id_space_exhausted_total",
        "Total allocations that gave up after the attempt cap"
    )
    .expect("register id_space_exhausted_total")
});

pub static ALLOCATION_ATTEMPTS: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "competency_tracker_allocation_attempts",
        "Candidates drawn per successful allocation",
        vec![1.0, 2.0, 3.0, 5.0, 10.0, 25.0, 100.0, 1000.0]
    )
    .expect("register allocation_attempts")
});

pub fn encode_metrics() -> Result<String, String> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| format!("metrics encode error: {e}"))?;
    String::from_utf8(buffer).map_err(|e| format!("metrics encode error: {e}"))
}

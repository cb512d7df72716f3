use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, IntCounterVec};

lazy_static! {
    /// Post writes by action (create/edit) and outcome (ok/invalid/not_author).
    pub static ref POST_WRITES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "blog_post_writes_total",
        "Post create/edit attempts segmented by outcome",
        &["action", "outcome"]
    )
    .expect("failed to register blog_post_writes_total");
}

pub fn record_post_write(action: &str, outcome: &str) {
    POST_WRITES_TOTAL.with_label_values(&[action, outcome]).inc();
}

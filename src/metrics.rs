//! Webhook receiver metrics
//!
//! Counts admitted deliveries and rejections broken down by reason, so that
//! spoofed-origin traffic can be told apart from signature failures, and
//! keeps a bounded sample of handler durations for percentiles.
//!
//! # Example
//!
//! ```rust
//! use tebex_sdk::error::WebhookErrorKind;
//! use tebex_sdk::metrics::WebhookMetrics;
//! use std::time::Duration;
//!
//! let metrics = WebhookMetrics::new();
//! metrics.record_rejection(WebhookErrorKind::OriginRejected);
//! metrics.record_handled(Duration::from_millis(12));
//!
//! let output = metrics.to_prometheus_format();
//! assert!(output.contains("reason=\"origin_rejected\"} 1"));
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use crate::error::WebhookErrorKind;

/// Maximum number of duration samples to keep
const MAX_DURATION_SAMPLES: usize = 1000;

const REJECTION_KINDS: [WebhookErrorKind; 4] = [
    WebhookErrorKind::OriginRejected,
    WebhookErrorKind::SignatureMissing,
    WebhookErrorKind::SignatureInvalid,
    WebhookErrorKind::MalformedPayload,
];

/// Thread-safe counters for a webhook receiver
#[derive(Debug)]
pub struct WebhookMetrics {
    /// Deliveries that passed authentication
    pub admitted_total: AtomicU64,
    /// Validation handshakes answered
    pub validations_total: AtomicU64,
    /// Deliveries whose handler returned an error
    pub handler_failures_total: AtomicU64,

    /// Deliveries from addresses outside the allow-list
    pub origin_rejected_total: AtomicU64,
    /// Deliveries without an `X-Signature` header
    pub signature_missing_total: AtomicU64,
    /// Deliveries whose signature did not match
    pub signature_invalid_total: AtomicU64,
    /// Authenticated deliveries with an unparseable body
    pub malformed_payload_total: AtomicU64,

    handler_durations: RwLock<RingBuffer<Duration>>,
}

/// Fixed-capacity sample buffer, oldest samples overwritten first
#[derive(Debug)]
struct RingBuffer<T> {
    data: Vec<T>,
    capacity: usize,
    write_pos: usize,
}

impl<T: Clone + Ord> RingBuffer<T> {
    fn new(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            capacity,
            write_pos: 0,
        }
    }

    fn push(&mut self, value: T) {
        if self.data.len() < self.capacity {
            self.data.push(value);
        } else {
            self.data[self.write_pos] = value;
        }
        self.write_pos = (self.write_pos + 1) % self.capacity;
    }

    /// Calculate percentile (0.0 to 1.0)
    fn percentile(&self, p: f64) -> Option<T> {
        if self.data.is_empty() {
            return None;
        }
        let mut sorted = self.data.clone();
        sorted.sort();
        let idx = ((sorted.len() as f64 - 1.0) * p).round() as usize;
        sorted.get(idx).cloned()
    }
}

impl WebhookMetrics {
    /// Create an empty metrics set
    pub fn new() -> Self {
        Self {
            admitted_total: AtomicU64::new(0),
            validations_total: AtomicU64::new(0),
            handler_failures_total: AtomicU64::new(0),
            origin_rejected_total: AtomicU64::new(0),
            signature_missing_total: AtomicU64::new(0),
            signature_invalid_total: AtomicU64::new(0),
            malformed_payload_total: AtomicU64::new(0),
            handler_durations: RwLock::new(RingBuffer::new(MAX_DURATION_SAMPLES)),
        }
    }

    /// Record an authenticated delivery
    pub fn record_admitted(&self) {
        self.admitted_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an answered validation handshake
    pub fn record_validation(&self) {
        self.validations_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a rejected delivery
    pub fn record_rejection(&self, kind: WebhookErrorKind) {
        self.counter(kind).fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful handler run
    pub fn record_handled(&self, duration: Duration) {
        if let Ok(mut durations) = self.handler_durations.write() {
            durations.push(duration);
        }
    }

    /// Record a failed handler run
    pub fn record_handler_failure(&self, duration: Duration) {
        self.handler_failures_total.fetch_add(1, Ordering::Relaxed);
        self.record_handled(duration);
    }

    /// Rejections seen for one reason
    pub fn rejections(&self, kind: WebhookErrorKind) -> u64 {
        self.counter(kind).load(Ordering::Relaxed)
    }

    fn counter(&self, kind: WebhookErrorKind) -> &AtomicU64 {
        match kind {
            WebhookErrorKind::OriginRejected => &self.origin_rejected_total,
            WebhookErrorKind::SignatureMissing => &self.signature_missing_total,
            WebhookErrorKind::SignatureInvalid => &self.signature_invalid_total,
            WebhookErrorKind::MalformedPayload => &self.malformed_payload_total,
        }
    }

    /// Convert metrics to Prometheus text format
    pub fn to_prometheus_format(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "tebex_webhook_admitted_total {}\n",
            self.admitted_total.load(Ordering::Relaxed)
        ));
        output.push_str(&format!(
            "tebex_webhook_validations_total {}\n",
            self.validations_total.load(Ordering::Relaxed)
        ));
        output.push_str(&format!(
            "tebex_webhook_handler_failures_total {}\n",
            self.handler_failures_total.load(Ordering::Relaxed)
        ));

        for kind in REJECTION_KINDS {
            output.push_str(&format!(
                "tebex_webhook_rejected_total{{reason=\"{}\"}} {}\n",
                kind.as_str(),
                self.rejections(kind)
            ));
        }

        if let Ok(durations) = self.handler_durations.read() {
            for (label, p) in [("p50", 0.5), ("p95", 0.95), ("p99", 0.99)] {
                if let Some(value) = durations.percentile(p) {
                    output.push_str(&format!(
                        "tebex_webhook_handler_duration_{}_ms {}\n",
                        label,
                        value.as_millis()
                    ));
                }
            }
        }

        output
    }
}

impl Default for WebhookMetrics {
    fn default() -> Self {
        Self::new()
    }
}

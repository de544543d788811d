use aspectweave::Container;
use std::sync::atomic::{AtomicU32, Ordering};

#[derive(Debug, PartialEq, Eq)]
pub struct OutOfStock;

/// Stock service whose calls are redirected to the interceptors generated
/// from `weave.json`
pub struct Inventory {
    pub(crate) services: Container,
    /// Reservations failing before one succeeds
    failures: u32,
    attempts: AtomicU32,
    pings: AtomicU32,
}

impl Inventory {
    pub fn new(services: Container, failures: u32) -> Self {
        Self {
            services,
            failures,
            attempts: AtomicU32::new(0),
            pings: AtomicU32::new(0),
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn pings(&self) -> u32 {
        self.pings.load(Ordering::SeqCst)
    }

    // #[validate_parameters] #[log_execution]
    pub(crate) async fn place(&self, sku: Option<String>, quantity: u32) -> u64 {
        sku.map_or(0, |sku| sku.len() as u64 * u64::from(quantity))
    }

    // #[retry(max_attempts = 3, delay_ms = 0)]
    pub(crate) fn reserve(&self, quantity: u32, held: &mut u32) -> Result<u32, OutOfStock> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= self.failures {
            return Err(OutOfStock);
        }
        *held += quantity;
        Ok(*held)
    }

    // #[validate_parameters]
    pub(crate) fn lookup(&self, coupon: &Option<String>) -> usize {
        coupon.as_ref().map_or(0, String::len)
    }

    // #[log_execution(order = 5, level = Debug)]
    pub(crate) fn ping(&self) {
        self.pings.fetch_add(1, Ordering::SeqCst);
    }
}

//! Finite pools of identifier names, consumed without replacement.
use std::collections::{
    HashMap,
    HashSet,
};

use rand::Rng;

/// Kind of identifier being drawn; each kind has its own pool and uniqueness domain.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum NameCategory {
    /// Application names.
    Application,
    /// Package path segments.
    Package,
    /// Class names.
    Class,
    /// Method names.
    Method,
}

impl NameCategory {
    /// Prefix used for synthesized names once the pool is exhausted.
    const fn fallback_prefix(self) -> &'static str {
        match self {
            Self::Application => "app",
            Self::Package => "pkg",
            Self::Class => "Class",
            Self::Method => "method",
        }
    }

    /// The built-in word list for this category.
    const fn words(self) -> &'static [&'static str] {
        match self {
            Self::Application => &[
                "petclinic", "bookstore", "webshop", "inventory", "payroll", "ticketing", "gateway", "billing",
                "scheduler", "mailer", "catalog", "reporting",
            ],
            Self::Package => &[
                "api", "core", "model", "service", "util", "config", "controller", "repository", "dto", "event",
                "handler", "security", "cache", "client", "domain", "impl", "internal", "io", "job", "mapper",
                "persistence", "web",
            ],
            Self::Class => &[
                "AccountService", "OrderController", "UserRepository", "PaymentProcessor", "CartManager",
                "InvoiceBuilder", "SessionCache", "EventPublisher", "ConfigLoader", "AuthFilter", "ProductMapper",
                "ShipmentTracker", "NotificationSender", "ReportGenerator", "TaskScheduler", "AuditLogger",
                "PriceCalculator", "CustomerValidator", "StockReservation", "TokenProvider", "HealthMonitor",
                "RetryPolicy", "MetricsCollector", "QueryExecutor",
            ],
            Self::Method => &[
                "getId", "setName", "findAll", "findById", "save", "delete", "update", "validate", "process",
                "handle", "execute", "load", "store", "compute", "render", "parse", "serialize", "init", "close",
                "refresh", "submit", "cancel", "notify", "resolve", "lookup", "register", "dispatch", "convert",
            ],
        }
    }
}

/// Hands out unique names per [`NameCategory`].
///
/// Each category starts with its built-in word list; draws are uniform and without replacement.
/// Once a list is used up, names of the form `<prefix><n>` are synthesized instead.
#[derive(Clone, Debug)]
pub struct NamePool {
    /// Words not handed out yet, per category.
    remaining: HashMap<NameCategory, Vec<&'static str>>,
    /// Everything handed out so far, per category.
    issued: HashMap<NameCategory, HashSet<String>>,
    /// Next suffix to try for synthesized names, per category.
    counters: HashMap<NameCategory, usize>,
}

impl Default for NamePool {
    fn default() -> Self {
        Self::new()
    }
}

impl NamePool {
    /// A fresh pool with every built-in word available.
    #[must_use]
    pub fn new() -> Self {
        let remaining = [NameCategory::Application, NameCategory::Package, NameCategory::Class, NameCategory::Method]
            .into_iter()
            .map(|c| (c, c.words().to_vec()))
            .collect();
        Self {
            remaining,
            issued: HashMap::new(),
            counters: HashMap::new(),
        }
    }

    /// Draw the next unused name in `category`.
    pub fn next<R: Rng>(&mut self, category: NameCategory, rng: &mut R) -> String {
        let pool = self.remaining.entry(category).or_default();
        let drawn = (!pool.is_empty()).then(|| pool.swap_remove(rng.gen_range(0..pool.len())));
        let name = drawn.map_or_else(|| self.synthesize(category), str::to_owned);
        self.issued.entry(category).or_default().insert(name.clone());
        name
    }

    /// Build a `<prefix><n>` name that has not been issued in this category yet.
    fn synthesize(&mut self, category: NameCategory) -> String {
        let issued = self.issued.entry(category).or_default();
        let counter = self.counters.entry(category).or_insert(0);
        loop {
            *counter += 1;
            let candidate = format!("{}{}", category.fallback_prefix(), counter);
            if !issued.contains(&candidate) {
                return candidate;
            }
        }
    }
}

/// Reduce an application name to a valid package segment (lowercase ASCII alphanumerics).
#[must_use]
pub fn sanitize_app_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if cleaned.is_empty() {
        "app".into()
    } else {
        cleaned
    }
}

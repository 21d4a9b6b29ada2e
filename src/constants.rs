//! Stable application-wide constants.
//!
//! Values here are structural invariants, algorithm coefficients, and default
//! fallbacks for env-var-based configuration. They should rarely change.
//! For per-request tuning knobs, see
//! [`RouteBuilderConfig`](crate::config::RouteBuilderConfig) instead.

// --- Server defaults (used when HOST / PORT env vars are absent) ---

/// Default bind address for the HTTP server.
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default port for the HTTP server.
pub const DEFAULT_PORT: &str = "3000";
/// Default lifetime of a cached tag match set. Overridden by `TAG_CACHE_TTL`.
pub const DEFAULT_TAG_CACHE_TTL_SECONDS: u64 = 3_600;
/// Maximum number of distinct tags held by the tag match set cache.
pub const DEFAULT_TAG_CACHE_MAX_ENTRIES: u64 = 256;

// --- Units ---

/// Mean Earth radius used by the haversine distance.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;
pub const MILES_TO_METERS: f64 = 1609.344;

// --- Route generation defaults ---

pub const DEFAULT_MAX_ROUTES: usize = 100;
/// One mile around the query point.
pub const DEFAULT_MAX_START_DISTANCE_M: f64 = MILES_TO_METERS;
pub const DEFAULT_MAX_ATTEMPTS: usize = 1_000;
pub const DEFAULT_MAX_STEPS: usize = 200;
pub const DEFAULT_TAG_BIAS: f64 = 3.0;
pub const DEFAULT_DISTANCE_BIAS: f64 = 1.0;
/// 1.0 means only exact edge-sequence repeats are suppressed.
pub const DEFAULT_ROUTE_SIMILARITY_THRESHOLD: f64 = 1.0;
pub const DEFAULT_WORKERS: usize = 1;

// --- Edge selection ---

/// Every viable edge keeps at least this much selection weight.
pub const EDGE_WEIGHT_FLOOR: f64 = 0.0001;
/// Lower bound on the length scale used for distance closeness.
pub const MIN_DISTANCE_SCALE_M: f64 = 1.0;

// --- Composite score coefficients ---
// Urban ranges roughly over [-0.2, 0.9]: -0.2 hostile, 0.3 mixed,
// 0.6 comfortable, 0.9+ very city-friendly.

pub const URBAN_SIDEWALK_WEIGHT: f64 = 0.35;
pub const URBAN_LIT_WEIGHT: f64 = 0.30;
pub const URBAN_RESIDENTIAL_WEIGHT: f64 = 0.25;
pub const URBAN_STEPS_PENALTY: f64 = 0.20;

// Accessibility is clamped at zero; nominally [0, 1].

pub const ACCESSIBILITY_PAVED_WEIGHT: f64 = 0.4;
pub const ACCESSIBILITY_SIDEWALK_WEIGHT: f64 = 0.4;
pub const ACCESSIBILITY_LIT_WEIGHT: f64 = 0.2;
pub const ACCESSIBILITY_STEPS_PENALTY: f64 = 0.8;

// Relaxed walk: -0.2 stressful, 0.2 neutral, 0.5 pleasant, 0.7+ very relaxed.

pub const RELAXED_TRAIL_WEIGHT: f64 = 0.4;
pub const RELAXED_RESIDENTIAL_WEIGHT: f64 = 0.3;
pub const RELAXED_STEPS_PENALTY: f64 = 0.2;

/// Wheelchair users need at least this accessibility score.
pub const WHEELCHAIR_MIN_ACCESSIBILITY: f64 = 0.5;

// --- Presentation ---

/// How many ids the CLI prints per route before eliding.
pub const ROUTE_PRINT_ID_LIMIT: usize = 20;

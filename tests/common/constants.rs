//! Shared constants for end-to-end tests
//!
//! Catalog entries and users referenced by the fixtures and the assertions.

// ============================================================================
// Test Catalog
// ============================================================================

pub const SONG_1_ID: &str = "SOMZWCG12A8C13C480";
pub const SONG_1_TITLE: &str = "I Didn't Mean To";
pub const SONG_1_DURATION: f64 = 218.93179;
pub const ARTIST_1_ID: &str = "ARD7TVE1187B99BFB1";
pub const ARTIST_1_NAME: &str = "Casual";

pub const SONG_2_ID: &str = "SOZCTXZ12AB0182364";
pub const SONG_2_TITLE: &str = "Setanta matins";
pub const SONG_2_DURATION: f64 = 269.58322;
pub const ARTIST_2_ID: &str = "AR5KOSW1187FB35FF4";
pub const ARTIST_2_NAME: &str = "Elena";

pub const SONG_3_ID: &str = "SOUPIRU12A6D4FA1E1";
pub const SONG_3_TITLE: &str = "Der Kleine Dompfaff";
pub const SONG_3_DURATION: f64 = 152.92036;
pub const ARTIST_3_ID: &str = "ARJIE2Y1187B994AB7";
pub const ARTIST_3_NAME: &str = "Line Renaud";

// ============================================================================
// Test Users
// ============================================================================

pub const USER_LILY: i64 = 15;
pub const USER_JACOB: i64 = 73;

/// 2018-11-12 02:35:45.796 UTC, a Monday in ISO week 46.
pub const TS_MONDAY: i64 = 1541990145796;

#![allow(dead_code)]

pub const TEST_REFERENCE_ID: &str = "12345";
pub const TEST_SOURCE_WALLET: &str = "0x11001";
pub const TEST_DESTINATION_WALLET: &str = "0x00100";
pub const TEST_CARD_NUMBER: &str = "1234567890123456";
pub const TEST_AMOUNT_WHOLE: u64 = 250;
pub const TEST_APPROVER: &str = "Card XXX";

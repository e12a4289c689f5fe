use crate::foundation::{ReferenceId, Result, SagaError, WalletId};
use crate::foundation::{AMOUNT_DECIMALS, AMOUNT_SCALE, MAX_CARD_DIGITS, MAX_REFERENCE_ID_LENGTH, MIN_CARD_DIGITS};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Fixed-point transfer amount with `AMOUNT_DECIMALS` fractional digits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(u64);

impl Amount {
    pub const fn from_base_units(units: u64) -> Self {
        Self(units)
    }

    pub fn from_whole(whole: u64) -> Result<Self> {
        whole
            .checked_mul(AMOUNT_SCALE)
            .map(Self)
            .ok_or_else(|| SagaError::InvalidAmount(format!("{whole} overflows base units")))
    }

    pub const fn base_units(self) -> u64 {
        self.0
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn parse_decimal(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.starts_with('-') {
            return Err(SagaError::InvalidAmount(format!("negative amount: {trimmed}")));
        }
        let (whole, frac) = match trimmed.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (trimmed, ""),
        };
        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SagaError::InvalidAmount(format!("not a decimal number: {trimmed}")));
        }
        if !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SagaError::InvalidAmount(format!("not a decimal number: {trimmed}")));
        }
        if frac.len() > AMOUNT_DECIMALS as usize {
            return Err(SagaError::InvalidAmount(format!("more than {AMOUNT_DECIMALS} fractional digits: {trimmed}")));
        }

        let whole: u64 = whole.parse().map_err(|_| SagaError::InvalidAmount(format!("amount too large: {trimmed}")))?;
        let mut frac_units: u64 = 0;
        for (idx, digit) in frac.bytes().enumerate() {
            let place = 10u64.pow(AMOUNT_DECIMALS - 1 - idx as u32);
            frac_units += u64::from(digit - b'0') * place;
        }
        whole
            .checked_mul(AMOUNT_SCALE)
            .and_then(|units| units.checked_add(frac_units))
            .map(Self)
            .ok_or_else(|| SagaError::InvalidAmount(format!("amount too large: {trimmed}")))
    }

    fn from_float(value: f64) -> Result<Self> {
        if !value.is_finite() || value < 0.0 {
            return Err(SagaError::InvalidAmount(format!("not a non-negative finite number: {value}")));
        }
        let units = (value * AMOUNT_SCALE as f64).round();
        if units > u64::MAX as f64 {
            return Err(SagaError::InvalidAmount(format!("amount too large: {value}")));
        }
        Ok(Self(units as u64))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / AMOUNT_SCALE;
        let frac = self.0 % AMOUNT_SCALE;
        if frac == 0 {
            return write!(f, "{whole}");
        }
        let digits = format!("{:0width$}", frac, width = AMOUNT_DECIMALS as usize);
        write!(f, "{whole}.{}", digits.trim_end_matches('0'))
    }
}

impl FromStr for Amount {
    type Err = SagaError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_decimal(s)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum AmountRepr {
            Text(String),
            Whole(u64),
            Float(f64),
        }

        let parsed = match AmountRepr::deserialize(deserializer)? {
            AmountRepr::Text(text) => Amount::parse_decimal(&text),
            AmountRepr::Whole(whole) => Amount::from_whole(whole),
            AmountRepr::Float(value) => Amount::from_float(value),
        };
        parsed.map_err(serde::de::Error::custom)
    }
}

#[derive(Deserialize)]
struct TransferRequestWire {
    source_wallet_id: WalletId,
    destination_wallet_id: WalletId,
    card_number: String,
    amount: Amount,
    reference_id: ReferenceId,
}

/// Immutable transfer input. Validated on construction and on deserialization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TransferRequestWire")]
pub struct TransferRequest {
    source_wallet_id: WalletId,
    destination_wallet_id: WalletId,
    card_number: String,
    amount: Amount,
    reference_id: ReferenceId,
}

impl TransferRequest {
    pub fn new(
        source_wallet_id: impl Into<WalletId>,
        destination_wallet_id: impl Into<WalletId>,
        card_number: impl Into<String>,
        amount: Amount,
        reference_id: impl Into<ReferenceId>,
    ) -> Result<Self> {
        let request = Self {
            source_wallet_id: source_wallet_id.into(),
            destination_wallet_id: destination_wallet_id.into(),
            card_number: card_number.into(),
            amount,
            reference_id: reference_id.into(),
        };
        request.validate()?;
        Ok(request)
    }

    pub fn source_wallet_id(&self) -> &WalletId {
        &self.source_wallet_id
    }

    pub fn destination_wallet_id(&self) -> &WalletId {
        &self.destination_wallet_id
    }

    pub fn card_number(&self) -> &str {
        &self.card_number
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn reference_id(&self) -> &ReferenceId {
        &self.reference_id
    }

    /// Card number with all but the last four digits hidden, for logs.
    pub fn masked_card(&self) -> String {
        let visible = self.card_number.len().saturating_sub(4);
        format!("{}{}", "*".repeat(visible), &self.card_number[visible..])
    }

    pub fn validate(&self) -> Result<()> {
        if self.reference_id.is_blank() {
            return Err(SagaError::MalformedRequest("reference_id is required".to_string()));
        }
        if self.reference_id.len() > MAX_REFERENCE_ID_LENGTH {
            return Err(SagaError::MalformedRequest(format!(
                "reference_id longer than {MAX_REFERENCE_ID_LENGTH} characters"
            )));
        }
        if self.source_wallet_id.is_blank() {
            return Err(SagaError::MalformedRequest("source_wallet_id is required".to_string()));
        }
        if self.destination_wallet_id.is_blank() {
            return Err(SagaError::MalformedRequest("destination_wallet_id is required".to_string()));
        }
        let digits = self.card_number.len();
        if !(MIN_CARD_DIGITS..=MAX_CARD_DIGITS).contains(&digits) || !self.card_number.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SagaError::MalformedRequest(format!(
                "card_number must be {MIN_CARD_DIGITS}-{MAX_CARD_DIGITS} digits"
            )));
        }
        if !self.amount.is_positive() {
            return Err(SagaError::InvalidAmount("amount must be positive".to_string()));
        }
        Ok(())
    }
}

impl TryFrom<TransferRequestWire> for TransferRequest {
    type Error = SagaError;

    fn try_from(wire: TransferRequestWire) -> Result<Self> {
        Self::new(wire.source_wallet_id, wire.destination_wallet_id, wire.card_number, wire.amount, wire.reference_id)
    }
}

use serde::{Deserialize, Serialize};

use crate::crypto::field::FieldElement;

/// Land right code carried by a title.
///
/// A small integer enumeration; `0` is reserved for "not disclosed" in the
/// public inputs and is never a meaningful tenure code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RightType(pub u8);

impl RightType {
    pub const FREEHOLD: RightType = RightType(3);
}

impl From<RightType> for FieldElement {
    fn from(value: RightType) -> Self {
        FieldElement::from(value.0)
    }
}

/// Plaintext facts about one land-title credential.
///
/// Any change to a field invalidates the ownership leaf derived from it and
/// every proof built on that leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandTitleRecord {
    /// Holder secret, never disclosed. Only its hash is public.
    pub owner_secret: FieldElement,
    pub parcel_id: String,
    /// Parcel area in square metres.
    pub area_m2: u64,
    pub right_type: RightType,
    pub district_id: u64,
    pub schema_id: String,
    pub issuer_id: String,
}

/// What the holder proves about the record, and whether the right type is revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisclosurePolicy {
    /// Public lower bound on `area_m2`.
    pub area_threshold: u64,
    /// Public district the parcel must lie in.
    pub district_expected: u64,
    pub reveal_right_type: bool,
}

impl DisclosurePolicy {
    pub fn reveal_flag(&self) -> FieldElement {
        FieldElement::from(self.reveal_right_type)
    }

    /// `right_type * reveal_flag`: the right type when revealed, `0` otherwise.
    ///
    /// This is a boolean toggle, not a general redaction scheme.
    pub fn disclosed_right_type(&self, right_type: RightType) -> FieldElement {
        FieldElement::from(right_type) * self.reveal_flag()
    }

    /// Whether the record meets the predicates the circuit enforces.
    pub fn is_satisfied_by(&self, record: &LandTitleRecord) -> bool {
        record.area_m2 >= self.area_threshold && record.district_id == self.district_expected
    }
}

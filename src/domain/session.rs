use super::OrderId;

/// Position of a user within the onboarding or checkout dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    Idle,
    AwaitingDisplayName,
    AwaitingStartLocation,
    AwaitingPhone,
    AwaitingAddress,
    AwaitingConfirmation,
    AwaitingPaymentProof,
}

impl Stage {
    /// Stages a user may abandon with an explicit cancel.
    pub fn is_cancellable(&self) -> bool {
        matches!(
            self,
            Stage::AwaitingPhone | Stage::AwaitingAddress | Stage::AwaitingConfirmation
        )
    }

    /// Stages between starting a checkout and handing in the payment proof.
    pub fn in_checkout(&self) -> bool {
        self.is_cancellable() || *self == Stage::AwaitingPaymentProof
    }
}

/// Values collected over the dialogue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutFields {
    pub display_name: Option<String>,
    pub start_location: Option<String>,
    pub phone: Option<String>,
    /// Free-text address, or a formatted `Location: lat, lon` pair.
    pub address: Option<String>,
}

/// Per-user dialogue state. Lives in memory only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub stage: Stage,
    pub fields: CheckoutFields,
    /// Order awaiting a payment proof from this user.
    pub last_order: Option<OrderId>,
}

impl Session {
    /// Moves to `next` and returns the stage that was left.
    pub fn advance(&mut self, next: Stage) -> Stage {
        std::mem::replace(&mut self.stage, next)
    }

    /// Ends a checkout after the payment proof arrived: checkout fields are wiped,
    /// the onboarding profile is kept.
    pub fn finish_checkout(&mut self) {
        self.fields.phone = None;
        self.fields.address = None;
        self.last_order = None;
        self.stage = Stage::Idle;
    }
}

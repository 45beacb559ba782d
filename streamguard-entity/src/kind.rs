// streamguard-entity/src/kind.rs

/// The entity classes the engine can recognise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    UsSsn,
    CreditCard,
    BankNumber,
    DateTime,
    CardExpiry,
    Cvv,
    Amount,
    Location,
    Identifier,
    Phone,
    Email,
}

impl EntityKind {
    /// Upper-case label used in placeholders, e.g. `<US_SSN>`.
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::UsSsn => "US_SSN",
            EntityKind::CreditCard => "CREDIT_CARD",
            EntityKind::BankNumber => "US_BANK_NUMBER",
            EntityKind::DateTime => "DATE_TIME",
            EntityKind::CardExpiry => "CARD_EXPIRY",
            EntityKind::Cvv => "CVV",
            EntityKind::Amount => "AMOUNT",
            EntityKind::Location => "LOCATION",
            EntityKind::Identifier => "ID",
            EntityKind::Phone => "PHONE_NUMBER",
            EntityKind::Email => "EMAIL_ADDRESS",
        }
    }

    /// Phone numbers and e-mail addresses are contact details the caller is
    /// allowed to see; everything else is anonymised.
    pub fn is_restricted(self) -> bool {
        !matches!(self, EntityKind::Phone | EntityKind::Email)
    }
}

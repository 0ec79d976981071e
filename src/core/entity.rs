//! Order lifecycle status shared by the workflow, store and CLI

use serde::{Deserialize, Serialize};

/// The 13 fixed order lifecycle states, in happy-path order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[derive(Default)]
pub enum OrderStatus {
    #[default]
    OrderCreated,
    PartsSentWaitingArrival,
    ReadyForPreQc,
    ReadyForProduction,
    AssemblyInProgress,
    ReadyForEolTesting,
    EolTestingInProgress,
    TestingComplete,
    PackagingInProgress,
    PackagingComplete,
    ReadyForFinalQc,
    ReadyForShip,
    Shipped,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 13] = [
        OrderStatus::OrderCreated,
        OrderStatus::PartsSentWaitingArrival,
        OrderStatus::ReadyForPreQc,
        OrderStatus::ReadyForProduction,
        OrderStatus::AssemblyInProgress,
        OrderStatus::ReadyForEolTesting,
        OrderStatus::EolTestingInProgress,
        OrderStatus::TestingComplete,
        OrderStatus::PackagingInProgress,
        OrderStatus::PackagingComplete,
        OrderStatus::ReadyForFinalQc,
        OrderStatus::ReadyForShip,
        OrderStatus::Shipped,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::OrderCreated => "ORDER_CREATED",
            OrderStatus::PartsSentWaitingArrival => "PARTS_SENT_WAITING_ARRIVAL",
            OrderStatus::ReadyForPreQc => "READY_FOR_PRE_QC",
            OrderStatus::ReadyForProduction => "READY_FOR_PRODUCTION",
            OrderStatus::AssemblyInProgress => "ASSEMBLY_IN_PROGRESS",
            OrderStatus::ReadyForEolTesting => "READY_FOR_EOL_TESTING",
            OrderStatus::EolTestingInProgress => "EOL_TESTING_IN_PROGRESS",
            OrderStatus::TestingComplete => "TESTING_COMPLETE",
            OrderStatus::PackagingInProgress => "PACKAGING_IN_PROGRESS",
            OrderStatus::PackagingComplete => "PACKAGING_COMPLETE",
            OrderStatus::ReadyForFinalQc => "READY_FOR_FINAL_QC",
            OrderStatus::ReadyForShip => "READY_FOR_SHIP",
            OrderStatus::Shipped => "SHIPPED",
        }
    }

    /// Human label for dashboards and tables
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::OrderCreated => "Order Created",
            OrderStatus::PartsSentWaitingArrival => "Parts Shipped",
            OrderStatus::ReadyForPreQc => "Ready for Pre-QC",
            OrderStatus::ReadyForProduction => "Ready for Production",
            OrderStatus::AssemblyInProgress => "Assembly in Progress",
            OrderStatus::ReadyForEolTesting => "Ready for EOL Testing",
            OrderStatus::EolTestingInProgress => "EOL Testing in Progress",
            OrderStatus::TestingComplete => "Testing Complete",
            OrderStatus::PackagingInProgress => "Packaging in Progress",
            OrderStatus::PackagingComplete => "Packaging Complete",
            OrderStatus::ReadyForFinalQc => "Ready for Final QC",
            OrderStatus::ReadyForShip => "Ready for Ship",
            OrderStatus::Shipped => "Shipped",
        }
    }

    /// `SHIPPED` has no outbound transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Shipped)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace('-', "_");
        OrderStatus::ALL
            .iter()
            .find(|status| status.as_str() == normalized)
            .copied()
            .ok_or_else(|| format!("Unknown order status: {}", s))
    }
}

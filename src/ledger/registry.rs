//! Entity registry
//!
//! One descriptor per loan-syndication table. The generic handler and the
//! command router are driven entirely by these.

use crate::table::{KeyPolicy, TableSchema};

/// Who may mutate a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    /// Anyone
    Public,

    /// The bank named in this column of the row
    Column(&'static str),

    /// The bank named in `owner_column` of the row in `table` whose key is
    /// held in `column`
    Via {
        column: &'static str,
        table: &'static str,
        owner_column: &'static str,
    },

    /// Callers whose credential carries attribute `name` with `value`
    Attribute {
        name: &'static str,
        value: &'static str,
    },
}

/// A column holding another table's key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    pub column: &'static str,
    pub table: &'static str,
}

/// An `update<Entity><Suffix>` command rewriting one column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Update {
    pub suffix: &'static str,
    pub column: &'static str,
}

/// A `get<Table>By<Suffix>` listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Filter {
    pub suffix: &'static str,
    pub column: &'static str,
}

/// Schema and access rules of one entity table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityDescriptor {
    /// Singular name used in `add<Entity>` / `update<Entity><Suffix>`
    pub entity: &'static str,
    pub table: &'static str,
    /// Columns in storage order; the first is the sequence id
    pub columns: &'static [&'static str],
    pub owner: Owner,
    pub references: &'static [Reference],
    pub updates: &'static [Update],
    pub filters: &'static [Filter],
}

impl EntityDescriptor {
    /// Table schema; every registry table gets sequence ids
    pub fn schema(&self) -> TableSchema {
        TableSchema::new(self.table, self.columns).with_key(KeyPolicy::Sequence)
    }

    /// Position of `column` among the values an `add` call passes
    /// (the id column is not passed)
    pub fn input_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().skip(1).position(|c| *c == column)
    }

    pub fn add_command(&self) -> String {
        format!("add{}", self.entity)
    }

    pub fn quantity_command(&self) -> String {
        format!("get{}Quantity", self.table)
    }

    pub fn list_command(&self) -> String {
        format!("get{}List", self.table)
    }

    pub fn update_command(&self, update: &Update) -> String {
        format!("update{}{}", self.entity, update.suffix)
    }

    pub fn filter_command(&self, filter: &Filter) -> String {
        format!("get{}By{}", self.table, filter.suffix)
    }
}

// =============================================================================
// Table and column names
// =============================================================================

pub const PARTICIPANTS: &str = "Participants";
pub const LOANS: &str = "Loans";
pub const LOAN_SHARES: &str = "LoanShares";
pub const LOAN_REQUESTS: &str = "LoanRequests";
pub const LOAN_INVITATIONS: &str = "LoanInvitations";
pub const LOAN_NEGOTIATIONS: &str = "LoanNegotiations";
pub const TRANSACTIONS: &str = "Transactions";
pub const LOAN_RETURNS: &str = "LoanReturns";
pub const LOAN_SALES: &str = "LoanSales";
pub const ACCOUNTS: &str = "Accounts";

/// Role required to register participants
pub const ROLE_ATTRIBUTE: &str = "role";
pub const ASSIGNER_ROLE: &str = "assigner";

pub static REGISTRY: &[EntityDescriptor] = &[
    EntityDescriptor {
        entity: "Participant",
        table: PARTICIPANTS,
        columns: &["ParticipantKey", "ParticipantName", "ParticipantType"],
        owner: Owner::Attribute {
            name: ROLE_ATTRIBUTE,
            value: ASSIGNER_ROLE,
        },
        references: &[],
        updates: &[],
        filters: &[Filter {
            suffix: "Type",
            column: "ParticipantType",
        }],
    },
    EntityDescriptor {
        entity: "Loan",
        table: LOANS,
        columns: &[
            "LoanID",
            "LoanRequestID",
            "ArrangerBankID",
            "BorrowerID",
            "Amount",
            "InterestRate",
            "LoanTerm",
            "Status",
        ],
        owner: Owner::Column("ArrangerBankID"),
        references: &[Reference {
            column: "LoanRequestID",
            table: LOAN_REQUESTS,
        }],
        updates: &[Update {
            suffix: "Status",
            column: "Status",
        }],
        filters: &[],
    },
    EntityDescriptor {
        entity: "LoanShare",
        table: LOAN_SHARES,
        columns: &[
            "LoanShareID",
            "LoanID",
            "ParticipantBankID",
            "Amount",
            "NegotiationStatus",
        ],
        owner: Owner::Via {
            column: "LoanID",
            table: LOANS,
            owner_column: "ArrangerBankID",
        },
        references: &[Reference {
            column: "LoanID",
            table: LOANS,
        }],
        updates: &[],
        filters: &[],
    },
    EntityDescriptor {
        entity: "LoanRequest",
        table: LOAN_REQUESTS,
        columns: &[
            "LoanRequestID",
            "BorrowerID",
            "ArrangerBankID",
            "Amount",
            "ProjectName",
            "ProjectInformation",
            "Status",
        ],
        owner: Owner::Public,
        references: &[],
        updates: &[],
        filters: &[],
    },
    EntityDescriptor {
        entity: "LoanInvitation",
        table: LOAN_INVITATIONS,
        columns: &[
            "LoanInvitationID",
            "ArrangerBankID",
            "BorrowerID",
            "LoanRequestID",
            "LoanTerm",
            "Amount",
            "InterestRate",
            "Info",
            "Status",
        ],
        owner: Owner::Column("ArrangerBankID"),
        references: &[],
        updates: &[Update {
            suffix: "Status",
            column: "Status",
        }],
        filters: &[],
    },
    EntityDescriptor {
        entity: "LoanNegotiation",
        table: LOAN_NEGOTIATIONS,
        columns: &[
            "LoanNegotiationID",
            "LoanInvitationID",
            "ParticipantBankID",
            "Amount",
            "NegotiationStatus",
            "ParticipantBankComment",
        ],
        owner: Owner::Via {
            column: "LoanInvitationID",
            table: LOAN_INVITATIONS,
            owner_column: "ArrangerBankID",
        },
        references: &[Reference {
            column: "LoanInvitationID",
            table: LOAN_INVITATIONS,
        }],
        updates: &[Update {
            suffix: "Status",
            column: "NegotiationStatus",
        }],
        filters: &[],
    },
    EntityDescriptor {
        entity: "Transaction",
        table: TRANSACTIONS,
        columns: &[
            "TransactionID",
            "FromAccountID",
            "ToAccountID",
            "Amount",
            "Purpose",
        ],
        owner: Owner::Public,
        references: &[
            Reference {
                column: "FromAccountID",
                table: ACCOUNTS,
            },
            Reference {
                column: "ToAccountID",
                table: ACCOUNTS,
            },
        ],
        updates: &[],
        filters: &[],
    },
    EntityDescriptor {
        entity: "LoanReturn",
        table: LOAN_RETURNS,
        columns: &["LoanReturnID", "LoanID", "Amount", "ReturnDate", "Status"],
        owner: Owner::Via {
            column: "LoanID",
            table: LOANS,
            owner_column: "ArrangerBankID",
        },
        references: &[Reference {
            column: "LoanID",
            table: LOANS,
        }],
        updates: &[],
        filters: &[],
    },
    EntityDescriptor {
        entity: "LoanSale",
        table: LOAN_SALES,
        columns: &[
            "LoanSaleID",
            "LoanShareID",
            "SellerBankID",
            "BuyerBankID",
            "Amount",
            "Status",
        ],
        owner: Owner::Column("SellerBankID"),
        references: &[Reference {
            column: "LoanShareID",
            table: LOAN_SHARES,
        }],
        updates: &[Update {
            suffix: "Status",
            column: "Status",
        }],
        filters: &[],
    },
    EntityDescriptor {
        entity: "Account",
        table: ACCOUNTS,
        columns: &["AccountID", "ParticipantKey", "Amount"],
        owner: Owner::Public,
        references: &[Reference {
            column: "ParticipantKey",
            table: PARTICIPANTS,
        }],
        updates: &[Update {
            suffix: "Amount",
            column: "Amount",
        }],
        filters: &[],
    },
];

/// Descriptor of `table`, if it is a registry table
pub fn find(table: &str) -> Option<&'static EntityDescriptor> {
    REGISTRY.iter().find(|d| d.table == table)
}

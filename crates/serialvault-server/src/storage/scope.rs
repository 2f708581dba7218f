//! Access scope for catalog queries.
//!
//! Every catalog operation takes a [`Scope`]. An unscoped query sees every
//! record; a user scope adds an `EXISTS` semi-join against the user's account
//! links while the query is built, so rows outside the user's accounts are
//! never read.

use sqlx::{QueryBuilder, Sqlite};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Scope {
    /// Administrative access.
    #[default]
    Unscoped,
    /// Restricted to accounts linked to this username.
    User(String),
}

impl Scope {
    pub fn user(username: impl Into<String>) -> Self {
        Self::User(username.into())
    }

    /// Append ` AND <account is linked to the user>`.
    ///
    /// `account` pushes the SQL expression (column or bind) holding the
    /// account id being checked.
    pub(crate) fn push_account_filter<'a>(
        &self,
        qb: &mut QueryBuilder<'a, Sqlite>,
        account: impl FnOnce(&mut QueryBuilder<'a, Sqlite>),
    ) {
        if let Self::User(username) = self {
            qb.push(
                " AND EXISTS (SELECT 1 FROM useraccountlink ul \
                 INNER JOIN userinfo ui ON ui.id = ul.user_id \
                 WHERE ul.account_id = ",
            );
            account(qb);
            qb.push(" AND ui.username = ");
            qb.push_bind(username.clone());
            qb.push(")");
        }
    }

    /// Append ` AND <brand belongs to an account linked to the user>`.
    pub(crate) fn push_brand_filter<'a>(
        &self,
        qb: &mut QueryBuilder<'a, Sqlite>,
        brand: impl FnOnce(&mut QueryBuilder<'a, Sqlite>),
    ) {
        if let Self::User(username) = self {
            qb.push(
                " AND EXISTS (SELECT 1 FROM account ua \
                 INNER JOIN useraccountlink ul ON ul.account_id = ua.id \
                 INNER JOIN userinfo ui ON ui.id = ul.user_id \
                 WHERE ua.authority_id = ",
            );
            brand(qb);
            qb.push(" AND ui.username = ");
            qb.push_bind(username.clone());
            qb.push(")");
        }
    }
}

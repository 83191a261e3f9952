//! Persisting reconciliation results.
//!
//! Each save writes the match rows and flips the source flags inside a
//! single transaction, so a failed run leaves no partial state behind. A
//! flag only flips from 0 to 1; finding a source row already matched aborts
//! the whole save with a conflict.

use super::Db;
use crate::error::AppError;
use crate::models::{BankRecord, BfMatchedRow, FinanceRecord, MatchSource, TallyRecord};
use chrono::NaiveDateTime;
use sqlx::{Sqlite, Transaction};

/// One bank row and the finance rows it paid.
#[derive(Debug)]
pub struct BfGroupRows<'a> {
    pub match_id: String,
    pub match_type: String,
    pub bank: &'a BankRecord,
    pub finances: Vec<&'a FinanceRecord>,
}

/// One bank row paired with one Tally voucher on a cheque reference.
#[derive(Debug)]
pub struct BtPairRows<'a> {
    pub match_id: String,
    pub cheque_ref: String,
    pub bank: &'a BankRecord,
    pub tally: &'a TallyRecord,
}

/// A bank-finance group confirmed against Tally vouchers.
#[derive(Debug)]
pub struct BftGroupRows<'a> {
    pub match_id: String,
    pub match_type: String,
    pub bf_match_id: String,
    pub bank: &'a BfMatchedRow,
    pub finances: Vec<&'a BfMatchedRow>,
    pub tallies: Vec<&'a TallyRecord>,
}

impl Db {
    /// Store bank-finance groups and flag their sources. Returns the number
    /// of `bf_matched` rows written.
    pub async fn save_bf_groups(
        &self,
        groups: &[BfGroupRows<'_>],
        matched_at: NaiveDateTime,
    ) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for group in groups {
            let bank = group.bank;
            sqlx::query(
                "INSERT INTO bf_matched (bf_match_id, bf_source, bf_match_type, bank_code, acct_no, \
                 statement_month, statement_year, bank_id, bank_uid, B_Date, B_Particulars, \
                 B_Ref_Cheque, B_Withdrawal, B_Deposit, B_Balance, bank_ven, bf_date_matched) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&group.match_id)
            .bind(MatchSource::Bank.as_str())
            .bind(&group.match_type)
            .bind(&bank.entry.bank_code)
            .bind(&bank.entry.acct_no)
            .bind(&bank.entry.statement_month)
            .bind(&bank.entry.statement_year)
            .bind(bank.bank_id)
            .bind(&bank.entry.bank_uid)
            .bind(bank.entry.date)
            .bind(&bank.entry.particulars)
            .bind(&bank.entry.ref_cheque)
            .bind(bank.entry.withdrawal)
            .bind(bank.entry.deposit)
            .bind(bank.entry.balance)
            .bind(&bank.entry.bank_ven)
            .bind(matched_at)
            .execute(&mut *tx)
            .await?;

            let flagged = sqlx::query(
                "UPDATE bank_data SET bf_is_matched = 1, bf_date_matched = ? \
                 WHERE bank_id = ? AND bf_is_matched = 0",
            )
            .bind(matched_at)
            .bind(bank.bank_id)
            .execute(&mut *tx)
            .await?;
            claimed(flagged.rows_affected(), "bank", &bank.entry.bank_uid)?;

            // Finance rows are filed under the bank row's account and period.
            for fin in &group.finances {
                sqlx::query(
                    "INSERT INTO bf_matched (bf_match_id, bf_source, bf_match_type, bank_code, acct_no, \
                     statement_month, statement_year, fin_id, fin_uid, F_Credit_Amount, \
                     F_Receiver_Name, F_Sender_Account, F_Voucher_No, F_Payment_Date, fin_ven, \
                     bf_date_matched) \
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(&group.match_id)
                .bind(MatchSource::Finance.as_str())
                .bind(&group.match_type)
                .bind(&bank.entry.bank_code)
                .bind(&bank.entry.acct_no)
                .bind(&bank.entry.statement_month)
                .bind(&bank.entry.statement_year)
                .bind(fin.fin_id)
                .bind(&fin.entry.fin_uid)
                .bind(fin.entry.credit_amount)
                .bind(&fin.entry.receiver_name)
                .bind(&fin.entry.sender_account)
                .bind(&fin.entry.voucher_no)
                .bind(fin.entry.payment_date)
                .bind(&fin.entry.fin_ven)
                .bind(matched_at)
                .execute(&mut *tx)
                .await?;

                let flagged = sqlx::query(
                    "UPDATE fin_data SET bf_is_matched = 1, bf_date_matched = ? \
                     WHERE fin_id = ? AND bf_is_matched = 0",
                )
                .bind(matched_at)
                .bind(fin.fin_id)
                .execute(&mut *tx)
                .await?;
                claimed(flagged.rows_affected(), "finance", &fin.entry.fin_uid)?;
            }

            inserted += 1 + group.finances.len() as u64;
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Store bank-tally pairs and flag both sides. Returns the number of
    /// `bt_matched` rows written.
    pub async fn save_bt_pairs(
        &self,
        pairs: &[BtPairRows<'_>],
        matched_at: NaiveDateTime,
    ) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await?;

        for pair in pairs {
            let bank = pair.bank;
            let tally = pair.tally;

            sqlx::query(
                "INSERT INTO bt_matched (bt_match_id, bt_source, bank_code, acct_no, statement_month, \
                 statement_year, bank_uid, B_Date, B_Particulars, B_Ref_Cheque, B_Withdrawal, \
                 B_Deposit, bank_ven, cheque_ref, input_date, bt_date_matched) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&pair.match_id)
            .bind(MatchSource::Bank.as_str())
            .bind(&bank.entry.bank_code)
            .bind(&bank.entry.acct_no)
            .bind(&bank.entry.statement_month)
            .bind(&bank.entry.statement_year)
            .bind(&bank.entry.bank_uid)
            .bind(bank.entry.date)
            .bind(&bank.entry.particulars)
            .bind(&bank.entry.ref_cheque)
            .bind(bank.entry.withdrawal)
            .bind(bank.entry.deposit)
            .bind(&bank.entry.bank_ven)
            .bind(&pair.cheque_ref)
            .bind(matched_at)
            .bind(matched_at)
            .execute(&mut *tx)
            .await?;

            insert_bt_tally(&mut tx, &pair.match_id, tally, &pair.cheque_ref, matched_at).await?;

            let flagged = sqlx::query(
                "UPDATE bank_data SET bt_is_matched = 1, bt_date_matched = ? \
                 WHERE bank_id = ? AND bt_is_matched = 0",
            )
            .bind(matched_at)
            .bind(bank.bank_id)
            .execute(&mut *tx)
            .await?;
            claimed(flagged.rows_affected(), "bank", &bank.entry.bank_uid)?;

            let flagged = sqlx::query(
                "UPDATE tally_data SET bt_is_matched = 1, bt_date_matched = ? \
                 WHERE tally_id = ? AND bt_is_matched = 0",
            )
            .bind(matched_at)
            .bind(tally.tally_id)
            .execute(&mut *tx)
            .await?;
            claimed(flagged.rows_affected(), "tally", &tally.entry.tally_uid)?;
        }

        tx.commit().await?;
        Ok(pairs.len() as u64 * 2)
    }

    /// Store bank-finance-tally groups and flag every participant. Returns
    /// the number of `bft_matched` rows written.
    pub async fn save_bft_groups(
        &self,
        groups: &[BftGroupRows<'_>],
        matched_at: NaiveDateTime,
    ) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for group in groups {
            let bank = group.bank;
            let scope = (
                &bank.bank_code,
                &bank.acct_no,
                &bank.statement_month,
                &bank.statement_year,
            );

            sqlx::query(
                "INSERT INTO bft_matched (bft_match_id, bft_source, bft_match_type, bf_match_id, \
                 bank_code, acct_no, statement_month, statement_year, bank_uid, B_Date, \
                 B_Particulars, B_Ref_Cheque, B_Withdrawal, B_Deposit, bank_ven, input_date, \
                 bft_date_matched) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&group.match_id)
            .bind(MatchSource::Bank.as_str())
            .bind(&group.match_type)
            .bind(&group.bf_match_id)
            .bind(scope.0)
            .bind(scope.1)
            .bind(scope.2)
            .bind(scope.3)
            .bind(&bank.bank_uid)
            .bind(bank.b_date)
            .bind(&bank.b_particulars)
            .bind(&bank.b_ref_cheque)
            .bind(bank.b_withdrawal)
            .bind(bank.b_deposit)
            .bind(&bank.bank_ven)
            .bind(matched_at)
            .bind(matched_at)
            .execute(&mut *tx)
            .await?;

            let flagged = sqlx::query(
                "UPDATE bank_data SET bft_is_matched = 1, bft_date_matched = ? \
                 WHERE bank_uid = ? AND bft_is_matched = 0",
            )
            .bind(matched_at)
            .bind(&bank.bank_uid)
            .execute(&mut *tx)
            .await?;
            claimed(flagged.rows_affected(), "bank", bank.bank_uid.as_deref().unwrap_or_default())?;

            for fin in &group.finances {
                sqlx::query(
                    "INSERT INTO bft_matched (bft_match_id, bft_source, bft_match_type, bf_match_id, \
                     bank_code, acct_no, statement_month, statement_year, fin_uid, F_Credit_Amount, \
                     F_Receiver_Name, F_Voucher_No, fin_ven, input_date, bft_date_matched) \
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(&group.match_id)
                .bind(MatchSource::Finance.as_str())
                .bind(&group.match_type)
                .bind(&group.bf_match_id)
                .bind(scope.0)
                .bind(scope.1)
                .bind(scope.2)
                .bind(scope.3)
                .bind(&fin.fin_uid)
                .bind(fin.f_credit_amount)
                .bind(&fin.f_receiver_name)
                .bind(&fin.f_voucher_no)
                .bind(&fin.fin_ven)
                .bind(matched_at)
                .bind(matched_at)
                .execute(&mut *tx)
                .await?;

                let flagged = sqlx::query(
                    "UPDATE fin_data SET bft_is_matched = 1, bft_date_matched = ? \
                     WHERE fin_uid = ? AND bft_is_matched = 0",
                )
                .bind(matched_at)
                .bind(&fin.fin_uid)
                .execute(&mut *tx)
                .await?;
                claimed(flagged.rows_affected(), "finance", fin.fin_uid.as_deref().unwrap_or_default())?;
            }

            for tally in &group.tallies {
                let t = &tally.entry;
                sqlx::query(
                    "INSERT INTO bft_matched (bft_match_id, bft_source, bft_match_type, bf_match_id, \
                     bank_code, acct_no, statement_month, statement_year, tally_uid, unit_name, \
                     T_Date, dr_cr, T_Particulars, T_Vch_Type, T_Vch_No, T_Debit, T_Credit, \
                     tally_ven, input_date, bft_date_matched) \
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(&group.match_id)
                .bind(MatchSource::Tally.as_str())
                .bind(&group.match_type)
                .bind(&group.bf_match_id)
                .bind(scope.0)
                .bind(scope.1)
                .bind(scope.2)
                .bind(scope.3)
                .bind(&t.tally_uid)
                .bind(&t.unit_name)
                .bind(t.date)
                .bind(&t.dr_cr)
                .bind(&t.particulars)
                .bind(&t.vch_type)
                .bind(&t.vch_no)
                .bind(t.debit)
                .bind(t.credit)
                .bind(&t.tally_ven)
                .bind(matched_at)
                .bind(matched_at)
                .execute(&mut *tx)
                .await?;

                let flagged = sqlx::query(
                    "UPDATE tally_data SET bft_is_matched = 1, bft_date_matched = ? \
                     WHERE tally_id = ? AND bft_is_matched = 0",
                )
                .bind(matched_at)
                .bind(tally.tally_id)
                .execute(&mut *tx)
                .await?;
                claimed(flagged.rows_affected(), "tally", &t.tally_uid)?;
            }

            let flagged = sqlx::query(
                "UPDATE bf_matched SET bft_is_matched = 1, bft_date_matched = ? \
                 WHERE bf_match_id = ? AND bft_is_matched = 0",
            )
            .bind(matched_at)
            .bind(&group.bf_match_id)
            .execute(&mut *tx)
            .await?;
            if flagged.rows_affected() == 0 {
                return Err(already_matched("bank-finance group", &group.bf_match_id));
            }

            inserted += 1 + (group.finances.len() + group.tallies.len()) as u64;
        }

        tx.commit().await?;
        Ok(inserted)
    }
}

/// Exactly one still-unmatched row must have been flagged.
fn claimed(rows_affected: u64, side: &str, uid: &str) -> Result<(), AppError> {
    if rows_affected == 1 {
        Ok(())
    } else {
        Err(already_matched(side, uid))
    }
}

fn already_matched(side: &str, uid: &str) -> AppError {
    tracing::warn!(side, uid, "Source row already matched, rolling back save");
    AppError::Conflict(format!(
        "The {side} row {uid} was matched by another run. No results were saved; run the reconciliation again."
    ))
}

async fn insert_bt_tally(
    tx: &mut Transaction<'_, Sqlite>,
    match_id: &str,
    tally: &TallyRecord,
    cheque_ref: &str,
    matched_at: NaiveDateTime,
) -> Result<(), AppError> {
    let t = &tally.entry;
    sqlx::query(
        "INSERT INTO bt_matched (bt_match_id, bt_source, bank_code, acct_no, statement_month, \
         statement_year, tally_uid, unit_name, T_Date, dr_cr, T_Particulars, T_Vch_Type, \
         T_Vch_No, T_Debit, T_Credit, tally_ven, cheque_ref, input_date, bt_date_matched) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(match_id)
    .bind(MatchSource::Tally.as_str())
    .bind(&t.bank_code)
    .bind(&t.acct_no)
    .bind(&t.statement_month)
    .bind(&t.statement_year)
    .bind(&t.tally_uid)
    .bind(&t.unit_name)
    .bind(t.date)
    .bind(&t.dr_cr)
    .bind(&t.particulars)
    .bind(&t.vch_type)
    .bind(&t.vch_no)
    .bind(t.debit)
    .bind(t.credit)
    .bind(&t.tally_ven)
    .bind(cheque_ref)
    .bind(matched_at)
    .bind(matched_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

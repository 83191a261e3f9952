//! Source ledgers: upload inserts and reconciliation candidates.

use super::Db;
use crate::error::AppError;
use crate::models::{BankEntry, BankRecord, BfMatchedRow, FinanceEntry, FinanceRecord, TallyEntry, TallyRecord};
use crate::time_utils::now_local;

impl Db {
    /// Insert parsed bank lines; all or nothing.
    pub async fn insert_bank_entries(&self, entries: &[BankEntry]) -> Result<u64, AppError> {
        let input_date = now_local();
        let mut tx = self.pool.begin().await?;
        for e in entries {
            sqlx::query(
                "INSERT INTO bank_data (bank_uid, bank_code, acct_no, statement_month, statement_year, \
                 B_Date, B_Particulars, B_Ref_Cheque, B_Withdrawal, B_Deposit, B_Balance, bank_ven, input_date) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&e.bank_uid)
            .bind(&e.bank_code)
            .bind(&e.acct_no)
            .bind(&e.statement_month)
            .bind(&e.statement_year)
            .bind(e.date)
            .bind(&e.particulars)
            .bind(&e.ref_cheque)
            .bind(e.withdrawal)
            .bind(e.deposit)
            .bind(e.balance)
            .bind(&e.bank_ven)
            .bind(input_date)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(entries.len() as u64)
    }

    /// Insert parsed finance lines; all or nothing.
    pub async fn insert_finance_entries(&self, entries: &[FinanceEntry]) -> Result<u64, AppError> {
        let input_date = now_local();
        let mut tx = self.pool.begin().await?;
        for e in entries {
            sqlx::query(
                "INSERT INTO fin_data (fin_uid, F_Routing_No, F_Receiving_AC_No, F_Credit_Amount, \
                 F_Receiver_Name, F_Bank_Name, F_Branch_Name, F_Sender_Name, F_Sender_Account, \
                 F_Sender_Bank, F_Unit_Name, F_Team_Name, F_New_Project, F_Project, F_Sub_Project, \
                 F_PO, F_Status, F_Voucher_Date, F_Voucher_No, F_Payment_Date, F_Payment_Month, \
                 F_Remarks, F_Mark, F_Concern, fin_ven, bank_code, acct_no, statement_month, \
                 statement_year, input_date) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&e.fin_uid)
            .bind(&e.routing_no)
            .bind(&e.receiving_ac_no)
            .bind(e.credit_amount)
            .bind(&e.receiver_name)
            .bind(&e.bank_name)
            .bind(&e.branch_name)
            .bind(&e.sender_name)
            .bind(&e.sender_account)
            .bind(&e.sender_bank)
            .bind(&e.unit_name)
            .bind(&e.team_name)
            .bind(&e.new_project)
            .bind(&e.project)
            .bind(&e.sub_project)
            .bind(&e.po)
            .bind(&e.status)
            .bind(e.voucher_date)
            .bind(&e.voucher_no)
            .bind(e.payment_date)
            .bind(&e.payment_month)
            .bind(&e.remarks)
            .bind(&e.mark)
            .bind(&e.concern)
            .bind(&e.fin_ven)
            .bind(&e.bank_code)
            .bind(&e.acct_no)
            .bind(&e.statement_month)
            .bind(&e.statement_year)
            .bind(input_date)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(entries.len() as u64)
    }

    /// Insert parsed Tally voucher lines; all or nothing.
    pub async fn insert_tally_entries(&self, entries: &[TallyEntry]) -> Result<u64, AppError> {
        let input_date = now_local();
        let mut tx = self.pool.begin().await?;
        for e in entries {
            sqlx::query(
                "INSERT INTO tally_data (tally_uid, bank_code, acct_no, unit_name, statement_month, \
                 statement_year, T_Date, dr_cr, T_Particulars, T_Vch_Type, T_Vch_No, T_Debit, \
                 T_Credit, tally_ven, input_date) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&e.tally_uid)
            .bind(&e.bank_code)
            .bind(&e.acct_no)
            .bind(&e.unit_name)
            .bind(&e.statement_month)
            .bind(&e.statement_year)
            .bind(e.date)
            .bind(&e.dr_cr)
            .bind(&e.particulars)
            .bind(&e.vch_type)
            .bind(&e.vch_no)
            .bind(e.debit)
            .bind(e.credit)
            .bind(&e.tally_ven)
            .bind(input_date)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(entries.len() as u64)
    }

    /// Bank rows not yet matched to finance.
    pub async fn bank_rows_for_bf(
        &self,
        bank_code: &str,
        acct_no: Option<&str>,
    ) -> Result<Vec<BankRecord>, AppError> {
        let mut qb = sqlx::QueryBuilder::new(
            "SELECT * FROM bank_data WHERE bf_is_matched = 0 AND bank_code = ",
        );
        qb.push_bind(bank_code);
        if let Some(acct_no) = acct_no {
            qb.push(" AND acct_no = ").push_bind(acct_no);
        }
        qb.push(" ORDER BY bank_id");
        Ok(qb.build_query_as::<BankRecord>().fetch_all(&self.pool).await?)
    }

    /// Finance rows sent from `bank_code` not yet matched to the bank.
    pub async fn finance_rows_for_bf(
        &self,
        bank_code: &str,
        acct_no: Option<&str>,
    ) -> Result<Vec<FinanceRecord>, AppError> {
        let mut qb = sqlx::QueryBuilder::new(
            "SELECT * FROM fin_data WHERE bf_is_matched = 0 AND F_Sender_Bank = ",
        );
        qb.push_bind(bank_code);
        if let Some(acct_no) = acct_no {
            qb.push(" AND acct_no = ").push_bind(acct_no);
        }
        qb.push(" ORDER BY fin_id");
        Ok(qb.build_query_as::<FinanceRecord>().fetch_all(&self.pool).await?)
    }

    /// Bank rows free for cheque pairing: neither BT- nor BF-matched.
    pub async fn bank_rows_for_bt(
        &self,
        bank_code: &str,
        acct_no: &str,
    ) -> Result<Vec<BankRecord>, AppError> {
        let rows = sqlx::query_as::<_, BankRecord>(
            "SELECT * FROM bank_data \
             WHERE bank_code = ? AND acct_no = ? AND bt_is_matched = 0 AND bf_is_matched = 0 \
             ORDER BY bank_id",
        )
        .bind(bank_code)
        .bind(acct_no)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Tally rows free for cheque pairing: neither BT- nor BFT-matched.
    pub async fn tally_rows_for_bt(
        &self,
        bank_code: &str,
        acct_no: &str,
    ) -> Result<Vec<TallyRecord>, AppError> {
        let rows = sqlx::query_as::<_, TallyRecord>(
            "SELECT * FROM tally_data \
             WHERE bank_code = ? AND acct_no = ? AND bt_is_matched = 0 AND bft_is_matched = 0 \
             ORDER BY tally_id",
        )
        .bind(bank_code)
        .bind(acct_no)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Tally rows not yet part of a bank-finance-tally group.
    pub async fn tally_rows_for_bft(
        &self,
        bank_code: &str,
        acct_no: &str,
    ) -> Result<Vec<TallyRecord>, AppError> {
        let rows = sqlx::query_as::<_, TallyRecord>(
            "SELECT * FROM tally_data \
             WHERE bank_code = ? AND acct_no = ? AND bft_is_matched = 0 \
             ORDER BY tally_id",
        )
        .bind(bank_code)
        .bind(acct_no)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// All rows of the bank-finance groups whose bank row belongs to the
    /// account and that have not gone through a BFT run, ordered by group.
    pub async fn bf_groups_for_bft(
        &self,
        bank_code: &str,
        acct_no: &str,
    ) -> Result<Vec<BfMatchedRow>, AppError> {
        let rows = sqlx::query_as::<_, BfMatchedRow>(
            "SELECT * FROM bf_matched \
             WHERE bft_is_matched = 0 AND bf_match_id IN ( \
                 SELECT bf_match_id FROM bf_matched \
                 WHERE LOWER(bf_source) = 'bank' AND bank_code = ? AND acct_no = ?) \
             ORDER BY bf_match_id, bf_id",
        )
        .bind(bank_code)
        .bind(acct_no)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

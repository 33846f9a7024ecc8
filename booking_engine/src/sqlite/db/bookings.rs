use log::trace;
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    booking_objects::BookingQueryFilter,
    db_types::{Booking, BookingId, NewBooking, PaymentPurpose},
};

/// Inserts a new booking in `pending` state with a freshly generated id and the deposit computed from the
/// requested percentage. This is not atomic on its own. You can embed this call inside a transaction if you need
/// atomicity, and pass `&mut *tx` as the connection argument.
pub async fn insert_booking(booking: NewBooking, conn: &mut SqliteConnection) -> Result<Booking, sqlx::Error> {
    let id = BookingId::random();
    let deposit = booking.deposit_amount();
    let booking = sqlx::query_as(
        r#"
            INSERT INTO bookings (
                id,
                customer_name,
                customer_email,
                event_date,
                hall,
                package,
                guests,
                notes,
                total_price,
                deposit_percent,
                deposit_amount,
                currency
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *;
        "#,
    )
    .bind(id.as_str())
    .bind(booking.customer_name)
    .bind(booking.customer_email)
    .bind(booking.event_date)
    .bind(booking.hall)
    .bind(booking.package)
    .bind(booking.guests)
    .bind(booking.notes)
    .bind(booking.total_price.value())
    .bind(i64::from(booking.deposit_percent))
    .bind(deposit.value())
    .bind(booking.currency)
    .fetch_one(conn)
    .await?;
    Ok(booking)
}

pub async fn fetch_booking_by_id(id: &BookingId, conn: &mut SqliteConnection) -> Result<Option<Booking>, sqlx::Error> {
    let booking =
        sqlx::query_as("SELECT * FROM bookings WHERE id = $1").bind(id.as_str()).fetch_optional(conn).await?;
    Ok(booking)
}

/// Fetches bookings according to criteria specified in the `BookingQueryFilter`.
///
/// Resulting bookings are ordered by `created_at` in descending order (newest first).
pub async fn search_bookings(
    query: BookingQueryFilter,
    conn: &mut SqliteConnection,
) -> Result<Vec<Booking>, sqlx::Error> {
    let mut builder = QueryBuilder::new(
        r#"
    SELECT * FROM bookings
    "#,
    );
    if !query.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(email) = query.customer_email {
        where_clause.push("customer_email = ");
        where_clause.push_bind_unseparated(email);
    }
    if let Some(status) = query.payment_status {
        where_clause.push("payment_status = ");
        where_clause.push_bind_unseparated(status.to_string());
    }
    if let Some(hall) = query.hall {
        where_clause.push("hall = ");
        where_clause.push_bind_unseparated(hall);
    }
    if let Some(from) = query.event_from {
        where_clause.push("event_date >= ");
        where_clause.push_bind_unseparated(from);
    }
    if let Some(until) = query.event_until {
        where_clause.push("event_date <= ");
        where_clause.push_bind_unseparated(until);
    }
    builder.push(" ORDER BY created_at DESC");

    trace!("📝️ Executing query: {}", builder.sql());
    let query = builder.build_query_as::<Booking>();
    let bookings = query.fetch_all(conn).await?;
    trace!("Result of search_bookings: {:?}", bookings.len());
    Ok(bookings)
}

/// Sets the processor customer reference if it is not already set. First write wins.
pub async fn set_customer_ref(
    id: &BookingId,
    customer_ref: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Booking>, sqlx::Error> {
    let booking = sqlx::query_as(
        r#"
            UPDATE bookings
            SET customer_ref = COALESCE(customer_ref, $2), updated_at = CURRENT_TIMESTAMP
            WHERE id = $1
            RETURNING *;
        "#,
    )
    .bind(id.as_str())
    .bind(customer_ref)
    .fetch_optional(conn)
    .await?;
    Ok(booking)
}

/// Sets the payment-request reference for the given purpose if it is not already set. First write wins.
pub async fn set_payment_ref(
    id: &BookingId,
    purpose: PaymentPurpose,
    payment_ref: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Booking>, sqlx::Error> {
    let sql = match purpose {
        PaymentPurpose::Deposit => {
            r#"
            UPDATE bookings
            SET deposit_payment_ref = COALESCE(deposit_payment_ref, $2), updated_at = CURRENT_TIMESTAMP
            WHERE id = $1
            RETURNING *;
        "#
        },
        PaymentPurpose::FinalPayment => {
            r#"
            UPDATE bookings
            SET final_payment_ref = COALESCE(final_payment_ref, $2), updated_at = CURRENT_TIMESTAMP
            WHERE id = $1
            RETURNING *;
        "#
        },
    };
    let booking = sqlx::query_as(sql).bind(id.as_str()).bind(payment_ref).fetch_optional(conn).await?;
    Ok(booking)
}

/// Transitions `pending → deposit_paid` in a single conditional statement. Returns `true` if the row
/// transitioned, `false` if it was already at `deposit_paid` or later (a duplicate delivery).
pub async fn mark_deposit_paid(id: &BookingId, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
            UPDATE bookings
            SET payment_status = 'deposit_paid',
                deposit_paid_at = COALESCE(deposit_paid_at, CURRENT_TIMESTAMP),
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $1 AND payment_status = 'pending';
        "#,
    )
    .bind(id.as_str())
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Transitions `pending|deposit_paid → paid`. When jumping straight from `pending`, the skipped
/// `deposit_paid_at` timestamp is backfilled so the record always reads as having passed through the deposit
/// stage. Returns `true` if the row transitioned.
pub async fn mark_paid(id: &BookingId, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
            UPDATE bookings
            SET payment_status = 'paid',
                paid_at = COALESCE(paid_at, CURRENT_TIMESTAMP),
                deposit_paid_at = COALESCE(deposit_paid_at, CURRENT_TIMESTAMP),
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $1 AND payment_status IN ('pending', 'deposit_paid');
        "#,
    )
    .bind(id.as_str())
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Transitions any non-terminal state to `failed`. Returns `true` if the row transitioned.
pub async fn mark_payment_failed(id: &BookingId, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
            UPDATE bookings
            SET payment_status = 'failed', updated_at = CURRENT_TIMESTAMP
            WHERE id = $1 AND payment_status IN ('pending', 'deposit_paid');
        "#,
    )
    .bind(id.as_str())
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Sets the receipt URL for the given purpose if it is not already set. First write wins, so a duplicate
/// webhook delivery can never overwrite an existing receipt.
pub async fn upsert_receipt(
    id: &BookingId,
    purpose: PaymentPurpose,
    url: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Booking>, sqlx::Error> {
    let sql = match purpose {
        PaymentPurpose::Deposit => {
            r#"
            UPDATE bookings
            SET deposit_receipt_url = COALESCE(deposit_receipt_url, $2), updated_at = CURRENT_TIMESTAMP
            WHERE id = $1
            RETURNING *;
        "#
        },
        PaymentPurpose::FinalPayment => {
            r#"
            UPDATE bookings
            SET final_receipt_url = COALESCE(final_receipt_url, $2), updated_at = CURRENT_TIMESTAMP
            WHERE id = $1
            RETURNING *;
        "#
        },
    };
    let booking = sqlx::query_as(sql).bind(id.as_str()).bind(url).fetch_optional(conn).await?;
    Ok(booking)
}

/// Transitions the contract `none → draft`. Returns `true` if the row transitioned, `false` if a draft (or
/// later state) already exists.
pub async fn set_contract_draft(
    id: &BookingId,
    draft_url: &str,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
            UPDATE bookings
            SET contract_status = 'draft',
                contract_draft_url = $2,
                contract_created_at = CURRENT_TIMESTAMP,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $1 AND contract_status = 'none';
        "#,
    )
    .bind(id.as_str())
    .bind(draft_url)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Marks the contract as signed. Requires an existing draft (or a previous signature, for a re-sign, which
/// refreshes the signed document, signer and timestamp). Returns `true` if a row was updated.
pub async fn set_contract_signed(
    id: &BookingId,
    signed_url: &str,
    signer_name: &str,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
            UPDATE bookings
            SET contract_status = 'signed',
                contract_signed_url = $2,
                contract_signer_name = $3,
                contract_signed_at = CURRENT_TIMESTAMP,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $1 AND contract_status IN ('draft', 'sent', 'signed');
        "#,
    )
    .bind(id.as_str())
    .bind(signed_url)
    .bind(signer_name)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

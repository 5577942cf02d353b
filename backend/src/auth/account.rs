//! Account records as stored, including the password hash that `User` omits.

use crate::db::{encode_ts, now, ts_column};
use crate::error::AppError;
use common::model::user::User;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const USER_COLUMNS: &str =
    "id, first_name, last_name, email, phone, profile_image, is_active, created_at, updated_at, password";

#[derive(Debug, Clone)]
pub struct StoredUser {
    pub user: User,
    pub password_hash: String,
}

/// Data of an account about to be created. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub profile_image: Option<String>,
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<StoredUser> {
    Ok(StoredUser {
        user: User {
            id: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            email: row.get(3)?,
            phone: row.get(4)?,
            profile_image: row.get(5)?,
            is_active: row.get(6)?,
            created_at: ts_column(row, 7)?,
            updated_at: ts_column(row, 8)?,
        },
        password_hash: row.get(9)?,
    })
}

pub fn find_by_id(conn: &Connection, id: &str) -> Result<Option<StoredUser>, AppError> {
    let sql = format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS);
    Ok(conn.query_row(&sql, params![id], map_row).optional()?)
}

pub fn find_by_email(conn: &Connection, email: &str) -> Result<Option<StoredUser>, AppError> {
    let sql = format!("SELECT {} FROM users WHERE email = ?1", USER_COLUMNS);
    Ok(conn.query_row(&sql, params![email], map_row).optional()?)
}

/// Inserts a new active account after checking email and phone uniqueness.
pub fn create(conn: &mut Connection, account: NewAccount) -> Result<User, AppError> {
    let tx = conn.transaction()?;

    let email_taken: bool = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1)",
        params![account.email],
        |row| row.get(0),
    )?;
    if email_taken {
        return Err(AppError::Conflict("Email already in use".to_string()));
    }
    if let Some(phone) = &account.phone {
        let phone_taken: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE phone = ?1)",
            params![phone],
            |row| row.get(0),
        )?;
        if phone_taken {
            return Err(AppError::Conflict("Phone number already in use".to_string()));
        }
    }

    let id = Uuid::new_v4().to_string();
    let ts = now();
    tx.execute(
        "INSERT INTO users (id, first_name, last_name, email, phone, password, profile_image, is_active, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8, ?8)",
        params![
            id,
            account.first_name,
            account.last_name,
            account.email,
            account.phone,
            account.password_hash,
            account.profile_image,
            encode_ts(&ts),
        ],
    )?;
    tx.commit()?;

    Ok(User {
        id,
        first_name: account.first_name,
        last_name: account.last_name,
        email: account.email,
        phone: account.phone,
        profile_image: account.profile_image,
        is_active: true,
        created_at: ts,
        updated_at: ts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrate;

    fn account(email: &str, phone: Option<&str>) -> NewAccount {
        NewAccount {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: email.into(),
            phone: phone.map(str::to_string),
            password_hash: "$argon2id$stub".into(),
            profile_image: None,
        }
    }

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        conn
    }

    #[test]
    fn created_account_is_found_by_email_and_id() {
        let mut conn = conn();
        let user = create(&mut conn, account("ada@example.com", Some("555-0100"))).unwrap();
        let by_email = find_by_email(&conn, "ada@example.com").unwrap().unwrap();
        assert_eq!(by_email.user, user);
        assert_eq!(by_email.password_hash, "$argon2id$stub");
        assert!(find_by_id(&conn, &user.id).unwrap().is_some());
        assert!(find_by_id(&conn, "missing").unwrap().is_none());
    }

    #[test]
    fn duplicate_email_and_phone_are_named() {
        let mut conn = conn();
        create(&mut conn, account("ada@example.com", Some("555-0100"))).unwrap();

        let err = create(&mut conn, account("ada@example.com", None)).unwrap_err();
        assert!(matches!(err, AppError::Conflict(ref m) if m.contains("Email")));

        let err = create(&mut conn, account("other@example.com", Some("555-0100"))).unwrap_err();
        assert!(matches!(err, AppError::Conflict(ref m) if m.contains("Phone")));
    }
}

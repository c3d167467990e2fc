use crate::bank::QuestionBank;
use crate::error::Result;
use crate::question::{Difficulty, Question};
use log::{debug, error, info, warn};
use rusqlite::types::Type;
use rusqlite::{params, Connection, DatabaseName, OpenFlags, Row};
use std::path::Path;
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
}

impl Category {
    pub fn insert(connection: &Connection, name: &str, position: i64) -> rusqlite::Result<()> {
        match connection.execute(
            "INSERT INTO Category(name, position) VALUES (?1, ?2)",
            params![name, position],
        ) {
            Ok(_) => {
                debug!("[DB] Created new Category '{}'", name);
                Ok(())
            }
            Err(err) => {
                error!("[DB] Error while creating new Category: {:?}", err);
                Err(err)
            }
        }
    }

    pub fn get_all(connection: &Connection) -> rusqlite::Result<Vec<Category>> {
        let mut statement =
            connection.prepare("SELECT name FROM Category ORDER BY position")?;
        let rows = statement.query_map([], |row| Ok(Category { name: row.get(0)? }))?;

        rows.collect()
    }
}

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

const QUESTION_COLUMNS: &str = "id, category, difficulty, question, options, correctAnswer, \
     explanation, section, topic";

impl Question {
    fn insert(connection: &Connection, question: &Question, position: i64) -> rusqlite::Result<()> {
        let options = serde_json::to_string(&question.options)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
        match connection.execute(
            "INSERT INTO \
            Question(id, category, difficulty, question, options, correctAnswer, explanation, \
                section, topic, position) \
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                question.id,
                question.category,
                question.difficulty.as_str(),
                question.question,
                options,
                question.correct_answer as i64,
                question.explanation,
                question.section,
                question.topic,
                position
            ],
        ) {
            Ok(_) => Ok(()),
            Err(err) => {
                error!("[DB] Error while creating Question {}: {:?}", question.id, err);
                Err(err)
            }
        }
    }

    fn from_row(row: &Row) -> rusqlite::Result<Question> {
        let difficulty: String = row.get(2)?;
        let options: String = row.get(4)?;
        let correct: i64 = row.get(5)?;
        Ok(Question {
            id: row.get(0)?,
            category: row.get(1)?,
            difficulty: difficulty
                .parse::<Difficulty>()
                .map_err(|e| conversion_error(2, e))?,
            question: row.get(3)?,
            options: serde_json::from_str(&options).map_err(|e| conversion_error(4, e))?,
            correct_answer: usize::try_from(correct).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(5, Type::Integer, Box::new(e))
            })?,
            explanation: row.get(6)?,
            section: row.get(7)?,
            topic: row.get(8)?,
        })
    }

    pub fn get_all(connection: &Connection) -> rusqlite::Result<Vec<Question>> {
        let mut statement = connection.prepare(&format!(
            "SELECT {QUESTION_COLUMNS} FROM Question ORDER BY position"
        ))?;
        let rows = statement.query_map([], |row| Self::from_row(row))?;

        rows.collect()
    }

    pub fn get_in_category(
        connection: &Connection,
        category: &str,
    ) -> rusqlite::Result<Vec<Question>> {
        let mut statement = connection.prepare(&format!(
            "SELECT {QUESTION_COLUMNS} FROM Question WHERE category = :category ORDER BY position"
        ))?;
        let rows = statement.query_map(&[(":category", &category)], |row| Self::from_row(row))?;

        rows.collect()
    }
}

/// Writes every category and question of `bank` in one transaction.
pub fn store_bank(connection: &mut Connection, bank: &QuestionBank) -> Result<()> {
    let now = Instant::now();
    let tx = connection.transaction()?;
    for (position, name) in bank.categories().iter().enumerate() {
        Category::insert(&tx, name, position as i64)?;
    }
    for (position, question) in bank.questions().iter().enumerate() {
        Question::insert(&tx, question, position as i64)?;
    }
    tx.commit()?;
    info!(
        "[DB] Stored {} questions in {} ms.",
        bank.len(),
        now.elapsed().as_millis()
    );
    Ok(())
}

/// Reads the whole bank back, validating it the same way a JSON bank is.
pub fn load_bank(connection: &Connection) -> Result<QuestionBank> {
    let now = Instant::now();
    let categories = Category::get_all(connection)?
        .into_iter()
        .map(|c| c.name)
        .collect();
    let questions = Question::get_all(connection)?;
    let bank = QuestionBank::new(categories, questions)?;
    debug!("[DB] Loading bank took {} ms.", now.elapsed().as_millis());
    Ok(bank)
}

pub fn create_or_open(src: &Path) -> Result<Connection> {
    if src.exists() {
        info!("[DB] Opening existing Database");
        open_db(src)
    } else {
        info!("[DB] Creating new Database");
        create_db(src)
    }
}

pub fn create_db(dest: &Path) -> Result<Connection> {
    let now = Instant::now();
    let db = init_db(Connection::open_in_memory()?)?;
    match db.backup(DatabaseName::Main, dest, None) {
        Ok(_) => {
            debug!(
                "[DB] Creating and Saving took {} ms.",
                now.elapsed().as_millis()
            );
        }
        Err(err) => {
            warn!("[DB] Failed to create database file: {}", err);
            close_db(db)?;
            return Err(err.into());
        }
    }
    close_db(db)?;
    open_db(dest)
}

/// Opens an existing database. A missing file is an error, not a new database.
pub fn open_db(src: &Path) -> Result<Connection> {
    let now = Instant::now();
    let db = Connection::open_with_flags(
        src,
        OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    debug!("[DB] Opening took {} ms.", now.elapsed().as_millis());
    Ok(db)
}

pub fn close_db(connection: Connection) -> Result<()> {
    info!("[DB] Closing Database");
    match connection.close() {
        Ok(_) => Ok(()),
        Err((_, err)) => {
            error!("[DB] Cannot close connection: {}", err);
            Err(err.into())
        }
    }
}

pub fn init_db(conn: Connection) -> Result<Connection> {
    info!("[DB INIT] Creating tables");
    conn.execute(
        "CREATE TABLE Category (
              name TEXT NOT NULL,
              position INTEGER NOT NULL,
              PRIMARY KEY (name)
            )",
        (),
    )?;
    info!("[DB INIT] Created table Category");
    conn.execute(
        "CREATE TABLE Question (
              id INTEGER NOT NULL PRIMARY KEY,
              category TEXT NOT NULL,
              difficulty TEXT NOT NULL,
              question TEXT NOT NULL,
              options TEXT NOT NULL,
              correctAnswer INTEGER NOT NULL,
              explanation TEXT NOT NULL,
              section TEXT,
              topic TEXT,
              position INTEGER NOT NULL,
              FOREIGN KEY (category) REFERENCES Category(name) ON UPDATE CASCADE
            )",
        (),
    )?;
    info!("[DB INIT] Created table Question");
    conn.execute(
        "CREATE INDEX Question_category_idx ON Question(category)",
        (),
    )?;
    info!("[DB INIT] Created index Question_category_idx");
    info!("[DB INIT] Database Creation Successful!");

    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::question;

    fn memory_db() -> Connection {
        init_db(Connection::open_in_memory().unwrap()).unwrap()
    }

    fn sample_bank() -> QuestionBank {
        let mut tagged = question(30, "Hazards");
        tagged.section = Some("Module 5".to_string());
        tagged.topic = Some("Overhead lines".to_string());
        tagged.difficulty = Difficulty::Advanced;
        QuestionBank::new(
            vec!["Legislation".to_string(), "Hazards".to_string(), "Assembly".to_string()],
            vec![question(12, "Hazards"), question(3, "Legislation"), tagged],
        )
        .unwrap()
    }

    #[test]
    fn store_then_load_preserves_bank() {
        let mut conn = memory_db();
        let bank = sample_bank();
        store_bank(&mut conn, &bank).unwrap();
        let loaded = load_bank(&conn).unwrap();
        assert_eq!(loaded, bank);
    }

    #[test]
    fn categories_come_back_in_declared_order() {
        let mut conn = memory_db();
        store_bank(&mut conn, &sample_bank()).unwrap();
        let names: Vec<String> = Category::get_all(&conn)
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Legislation", "Hazards", "Assembly"]);
    }

    #[test]
    fn questions_by_category() {
        let mut conn = memory_db();
        store_bank(&mut conn, &sample_bank()).unwrap();
        let hazards = Question::get_in_category(&conn, "Hazards").unwrap();
        let ids: Vec<u32> = hazards.iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![12, 30]);
        assert!(Question::get_in_category(&conn, "Assembly")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn duplicate_store_fails_and_rolls_back() {
        let mut conn = memory_db();
        let bank = sample_bank();
        store_bank(&mut conn, &bank).unwrap();
        assert!(store_bank(&mut conn, &bank).is_err());
        assert_eq!(load_bank(&conn).unwrap().len(), 3);
    }

    fn scratch_path(name: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir()
            .join(format!("examdraw-{}-{}.db", std::process::id(), name));
        let _ = std::fs::remove_file(&path);
        path
    }

    #[test]
    fn opening_missing_db_fails_without_creating_it() {
        let path = scratch_path("missing");
        assert!(open_db(&path).is_err());
        assert!(!path.exists());

        // A later import still gets a fresh database with tables.
        let mut conn = create_or_open(&path).unwrap();
        store_bank(&mut conn, &sample_bank()).unwrap();
        close_db(conn).unwrap();

        let conn = open_db(&path).unwrap();
        assert_eq!(load_bank(&conn).unwrap(), sample_bank());
        close_db(conn).unwrap();
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn bad_difficulty_in_row_is_reported() {
        let conn = memory_db();
        Category::insert(&conn, "A", 0).unwrap();
        conn.execute(
            "INSERT INTO Question(id, category, difficulty, question, options, correctAnswer, \
                explanation, position) VALUES (1, 'A', 'expert', 'Q?', '[\"x\"]', 0, 'E', 0)",
            (),
        )
        .unwrap();
        assert!(load_bank(&conn).is_err());
    }
}

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{FromRow, SqlitePool};
use std::str::FromStr;

use backoffice_types::domain::catalog::{
    Category, CategoryDraft, CategoryPatch, Product, ProductDraft, ProductPatch,
};
use backoffice_types::domain::customer::{Customer, CustomerDraft, CustomerPatch};
use backoffice_types::domain::order::{Order, OrderDraft, OrderItem};
use backoffice_types::domain::registrar::{
    Course, CourseDraft, CoursePatch, Enrollment, EnrollmentDraft, EnrollmentPatch, Student,
    StudentDraft, StudentPatch,
};
use backoffice_types::domain::resource::Resource;
use backoffice_types::ports::store::{OrderStore, RepoError, ResourceStore};

/// SQLite-backed store. Every simple CRUD call runs in its own transaction
/// scope; the composite order insert runs in one explicit transaction.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        // Foreign keys are the sole referential-integrity gate; nothing is
        // re-checked at the application layer.
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePool::connect_with(options).await?;

        // Apply the schema from the migration file.
        let ddl = include_str!("../migrations/0001_create_tables.sql");
        sqlx::query(ddl).execute(&pool).await?;

        Ok(Self { pool })
    }
}

fn map_db_err(e: sqlx::Error) -> RepoError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return RepoError::Conflict(db.message().to_string());
        }
    }
    RepoError::DbError(e.to_string())
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, RepoError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepoError::DbError(e.to_string()))
}

fn parse_date(raw: &str) -> Result<NaiveDate, RepoError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| RepoError::DbError(e.to_string()))
}

#[derive(FromRow)]
struct DbCategory {
    id: i64,
    name: String,
}

impl DbCategory {
    fn into_category(self) -> Category {
        Category {
            id: self.id,
            name: self.name,
        }
    }
}

#[async_trait]
impl ResourceStore<Category> for SqliteStore {
    async fn list(&self) -> Result<Vec<Category>, RepoError> {
        let rows: Vec<DbCategory> = sqlx::query_as("SELECT id, name FROM categories ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(rows.into_iter().map(DbCategory::into_category).collect())
    }

    async fn get(&self, id: i64) -> Result<Option<Category>, RepoError> {
        let row: Option<DbCategory> =
            sqlx::query_as("SELECT id, name FROM categories WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_db_err)?;
        Ok(row.map(DbCategory::into_category))
    }

    async fn create(&self, draft: CategoryDraft) -> Result<Category, RepoError> {
        let res = sqlx::query("INSERT INTO categories (name) VALUES (?)")
            .bind(&draft.name)
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(Category::hydrate(draft, res.last_insert_rowid(), Utc::now()))
    }

    async fn update(&self, id: i64, patch: CategoryPatch) -> Result<Option<Category>, RepoError> {
        let mut tx = self.pool.begin().await.map_err(map_db_err)?;
        let row: Option<DbCategory> =
            sqlx::query_as("SELECT id, name FROM categories WHERE id = ?")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(map_db_err)?;
        let Some(row) = row else { return Ok(None) };
        let mut category = row.into_category();
        category.apply(patch, Utc::now());
        sqlx::query("UPDATE categories SET name = ? WHERE id = ?")
            .bind(&category.name)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;
        tx.commit().await.map_err(map_db_err)?;
        Ok(Some(category))
    }

    async fn delete(&self, id: i64) -> Result<bool, RepoError> {
        let res = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(res.rows_affected() > 0)
    }
}

#[derive(FromRow)]
struct DbProduct {
    id: i64,
    name: String,
    price: f64,
    description: Option<String>,
    category_id: i64,
    created_at: String,
    updated_at: Option<String>,
}

impl DbProduct {
    fn into_product(self) -> Result<Product, RepoError> {
        Ok(Product {
            id: self.id,
            name: self.name,
            price: self.price,
            description: self.description,
            category_id: self.category_id,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: self
                .updated_at
                .as_deref()
                .map(parse_timestamp)
                .transpose()?,
        })
    }
}

const PRODUCT_COLUMNS: &str =
    "id, name, price, description, category_id, created_at, updated_at";

#[async_trait]
impl ResourceStore<Product> for SqliteStore {
    async fn list(&self) -> Result<Vec<Product>, RepoError> {
        let rows: Vec<DbProduct> =
            sqlx::query_as(&format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id"))
                .fetch_all(&self.pool)
                .await
                .map_err(map_db_err)?;
        rows.into_iter().map(DbProduct::into_product).collect()
    }

    async fn get(&self, id: i64) -> Result<Option<Product>, RepoError> {
        let row: Option<DbProduct> =
            sqlx::query_as(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_db_err)?;
        row.map(DbProduct::into_product).transpose()
    }

    async fn create(&self, draft: ProductDraft) -> Result<Product, RepoError> {
        let now = Utc::now();
        let res = sqlx::query(
            "INSERT INTO products (name, price, description, category_id, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&draft.name)
        .bind(draft.price)
        .bind(&draft.description)
        .bind(draft.category_id)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(Product::hydrate(draft, res.last_insert_rowid(), now))
    }

    async fn update(&self, id: i64, patch: ProductPatch) -> Result<Option<Product>, RepoError> {
        let mut tx = self.pool.begin().await.map_err(map_db_err)?;
        let row: Option<DbProduct> =
            sqlx::query_as(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"))
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(map_db_err)?;
        let Some(row) = row else { return Ok(None) };
        let mut product = row.into_product()?;
        product.apply(patch, Utc::now());
        sqlx::query(
            "UPDATE products SET name = ?, price = ?, description = ?, category_id = ?,
             updated_at = ? WHERE id = ?",
        )
        .bind(&product.name)
        .bind(product.price)
        .bind(&product.description)
        .bind(product.category_id)
        .bind(product.updated_at.map(|t| t.to_rfc3339()))
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(map_db_err)?;
        tx.commit().await.map_err(map_db_err)?;
        Ok(Some(product))
    }

    async fn delete(&self, id: i64) -> Result<bool, RepoError> {
        let res = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(res.rows_affected() > 0)
    }
}

#[derive(FromRow)]
struct DbCustomer {
    id: i64,
    name: String,
    email: String,
    created_at: String,
}

impl DbCustomer {
    fn into_customer(self) -> Result<Customer, RepoError> {
        Ok(Customer {
            id: self.id,
            name: self.name,
            email: self.email,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

#[async_trait]
impl ResourceStore<Customer> for SqliteStore {
    async fn list(&self) -> Result<Vec<Customer>, RepoError> {
        let rows: Vec<DbCustomer> =
            sqlx::query_as("SELECT id, name, email, created_at FROM customers ORDER BY id")
                .fetch_all(&self.pool)
                .await
                .map_err(map_db_err)?;
        rows.into_iter().map(DbCustomer::into_customer).collect()
    }

    async fn get(&self, id: i64) -> Result<Option<Customer>, RepoError> {
        let row: Option<DbCustomer> =
            sqlx::query_as("SELECT id, name, email, created_at FROM customers WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_db_err)?;
        row.map(DbCustomer::into_customer).transpose()
    }

    async fn create(&self, draft: CustomerDraft) -> Result<Customer, RepoError> {
        let now = Utc::now();
        let res = sqlx::query("INSERT INTO customers (name, email, created_at) VALUES (?, ?, ?)")
            .bind(&draft.name)
            .bind(&draft.email)
            .bind(now.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(Customer::hydrate(draft, res.last_insert_rowid(), now))
    }

    async fn update(&self, id: i64, patch: CustomerPatch) -> Result<Option<Customer>, RepoError> {
        let mut tx = self.pool.begin().await.map_err(map_db_err)?;
        let row: Option<DbCustomer> =
            sqlx::query_as("SELECT id, name, email, created_at FROM customers WHERE id = ?")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(map_db_err)?;
        let Some(row) = row else { return Ok(None) };
        let mut customer = row.into_customer()?;
        customer.apply(patch, Utc::now());
        sqlx::query("UPDATE customers SET name = ?, email = ? WHERE id = ?")
            .bind(&customer.name)
            .bind(&customer.email)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;
        tx.commit().await.map_err(map_db_err)?;
        Ok(Some(customer))
    }

    async fn delete(&self, id: i64) -> Result<bool, RepoError> {
        let res = sqlx::query("DELETE FROM customers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(res.rows_affected() > 0)
    }
}

#[derive(FromRow)]
struct DbStudent {
    id: i64,
    name: String,
    email: String,
    date_of_birth: Option<String>,
    major: Option<String>,
}

impl DbStudent {
    fn into_student(self) -> Result<Student, RepoError> {
        Ok(Student {
            id: self.id,
            name: self.name,
            email: self.email,
            date_of_birth: self.date_of_birth.as_deref().map(parse_date).transpose()?,
            major: self.major,
        })
    }
}

#[async_trait]
impl ResourceStore<Student> for SqliteStore {
    async fn list(&self) -> Result<Vec<Student>, RepoError> {
        let rows: Vec<DbStudent> = sqlx::query_as(
            "SELECT id, name, email, date_of_birth, major FROM students ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;
        rows.into_iter().map(DbStudent::into_student).collect()
    }

    async fn get(&self, id: i64) -> Result<Option<Student>, RepoError> {
        let row: Option<DbStudent> = sqlx::query_as(
            "SELECT id, name, email, date_of_birth, major FROM students WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;
        row.map(DbStudent::into_student).transpose()
    }

    async fn create(&self, draft: StudentDraft) -> Result<Student, RepoError> {
        let res = sqlx::query(
            "INSERT INTO students (name, email, date_of_birth, major) VALUES (?, ?, ?, ?)",
        )
        .bind(&draft.name)
        .bind(&draft.email)
        .bind(draft.date_of_birth.map(|d| d.to_string()))
        .bind(&draft.major)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(Student::hydrate(draft, res.last_insert_rowid(), Utc::now()))
    }

    async fn update(&self, id: i64, patch: StudentPatch) -> Result<Option<Student>, RepoError> {
        let mut tx = self.pool.begin().await.map_err(map_db_err)?;
        let row: Option<DbStudent> = sqlx::query_as(
            "SELECT id, name, email, date_of_birth, major FROM students WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_err)?;
        let Some(row) = row else { return Ok(None) };
        let mut student = row.into_student()?;
        student.apply(patch, Utc::now());
        sqlx::query(
            "UPDATE students SET name = ?, email = ?, date_of_birth = ?, major = ? WHERE id = ?",
        )
        .bind(&student.name)
        .bind(&student.email)
        .bind(student.date_of_birth.map(|d| d.to_string()))
        .bind(&student.major)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(map_db_err)?;
        tx.commit().await.map_err(map_db_err)?;
        Ok(Some(student))
    }

    async fn delete(&self, id: i64) -> Result<bool, RepoError> {
        let res = sqlx::query("DELETE FROM students WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(res.rows_affected() > 0)
    }
}

#[derive(FromRow)]
struct DbCourse {
    id: i64,
    title: String,
    description: Option<String>,
    credits: i64,
}

impl DbCourse {
    fn into_course(self) -> Course {
        Course {
            id: self.id,
            title: self.title,
            description: self.description,
            credits: self.credits,
        }
    }
}

#[async_trait]
impl ResourceStore<Course> for SqliteStore {
    async fn list(&self) -> Result<Vec<Course>, RepoError> {
        let rows: Vec<DbCourse> =
            sqlx::query_as("SELECT id, title, description, credits FROM courses ORDER BY id")
                .fetch_all(&self.pool)
                .await
                .map_err(map_db_err)?;
        Ok(rows.into_iter().map(DbCourse::into_course).collect())
    }

    async fn get(&self, id: i64) -> Result<Option<Course>, RepoError> {
        let row: Option<DbCourse> =
            sqlx::query_as("SELECT id, title, description, credits FROM courses WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_db_err)?;
        Ok(row.map(DbCourse::into_course))
    }

    async fn create(&self, draft: CourseDraft) -> Result<Course, RepoError> {
        let res = sqlx::query("INSERT INTO courses (title, description, credits) VALUES (?, ?, ?)")
            .bind(&draft.title)
            .bind(&draft.description)
            .bind(draft.credits)
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(Course::hydrate(draft, res.last_insert_rowid(), Utc::now()))
    }

    async fn update(&self, id: i64, patch: CoursePatch) -> Result<Option<Course>, RepoError> {
        let mut tx = self.pool.begin().await.map_err(map_db_err)?;
        let row: Option<DbCourse> =
            sqlx::query_as("SELECT id, title, description, credits FROM courses WHERE id = ?")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(map_db_err)?;
        let Some(row) = row else { return Ok(None) };
        let mut course = row.into_course();
        course.apply(patch, Utc::now());
        sqlx::query("UPDATE courses SET title = ?, description = ?, credits = ? WHERE id = ?")
            .bind(&course.title)
            .bind(&course.description)
            .bind(course.credits)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;
        tx.commit().await.map_err(map_db_err)?;
        Ok(Some(course))
    }

    async fn delete(&self, id: i64) -> Result<bool, RepoError> {
        let res = sqlx::query("DELETE FROM courses WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(res.rows_affected() > 0)
    }
}

#[derive(FromRow)]
struct DbEnrollment {
    id: i64,
    student_id: i64,
    course_id: i64,
    grade: Option<String>,
}

impl DbEnrollment {
    fn into_enrollment(self) -> Enrollment {
        Enrollment {
            id: self.id,
            student_id: self.student_id,
            course_id: self.course_id,
            grade: self.grade,
        }
    }
}

#[async_trait]
impl ResourceStore<Enrollment> for SqliteStore {
    async fn list(&self) -> Result<Vec<Enrollment>, RepoError> {
        let rows: Vec<DbEnrollment> = sqlx::query_as(
            "SELECT id, student_id, course_id, grade FROM enrollments ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(rows.into_iter().map(DbEnrollment::into_enrollment).collect())
    }

    async fn get(&self, id: i64) -> Result<Option<Enrollment>, RepoError> {
        let row: Option<DbEnrollment> = sqlx::query_as(
            "SELECT id, student_id, course_id, grade FROM enrollments WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(row.map(DbEnrollment::into_enrollment))
    }

    async fn create(&self, draft: EnrollmentDraft) -> Result<Enrollment, RepoError> {
        let res = sqlx::query(
            "INSERT INTO enrollments (student_id, course_id, grade) VALUES (?, ?, ?)",
        )
        .bind(draft.student_id)
        .bind(draft.course_id)
        .bind(&draft.grade)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(Enrollment::hydrate(draft, res.last_insert_rowid(), Utc::now()))
    }

    async fn update(
        &self,
        id: i64,
        patch: EnrollmentPatch,
    ) -> Result<Option<Enrollment>, RepoError> {
        let mut tx = self.pool.begin().await.map_err(map_db_err)?;
        let row: Option<DbEnrollment> = sqlx::query_as(
            "SELECT id, student_id, course_id, grade FROM enrollments WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_err)?;
        let Some(row) = row else { return Ok(None) };
        let mut enrollment = row.into_enrollment();
        enrollment.apply(patch, Utc::now());
        sqlx::query("UPDATE enrollments SET student_id = ?, course_id = ?, grade = ? WHERE id = ?")
            .bind(enrollment.student_id)
            .bind(enrollment.course_id)
            .bind(&enrollment.grade)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;
        tx.commit().await.map_err(map_db_err)?;
        Ok(Some(enrollment))
    }

    async fn delete(&self, id: i64) -> Result<bool, RepoError> {
        let res = sqlx::query("DELETE FROM enrollments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(res.rows_affected() > 0)
    }
}

#[derive(FromRow)]
struct DbOrder {
    id: i64,
    customer_id: i64,
    created_at: String,
}

#[derive(FromRow)]
struct DbOrderItem {
    id: i64,
    order_id: i64,
    product_id: i64,
    quantity: i64,
    created_at: String,
}

impl DbOrderItem {
    fn into_item(self) -> Result<OrderItem, RepoError> {
        Ok(OrderItem {
            id: self.id,
            order_id: self.order_id,
            product_id: self.product_id,
            quantity: self.quantity,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

impl SqliteStore {
    async fn load_order(&self, row: DbOrder) -> Result<Order, RepoError> {
        let items: Vec<DbOrderItem> = sqlx::query_as(
            "SELECT id, order_id, product_id, quantity, created_at FROM order_items
             WHERE order_id = ? ORDER BY id",
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(Order {
            id: row.id,
            customer_id: row.customer_id,
            created_at: parse_timestamp(&row.created_at)?,
            items: items
                .into_iter()
                .map(DbOrderItem::into_item)
                .collect::<Result<_, _>>()?,
        })
    }
}

#[async_trait]
impl OrderStore for SqliteStore {
    async fn create_order(&self, draft: OrderDraft) -> Result<Order, RepoError> {
        let now = Utc::now();
        // All inserts commit together; any failure rolls the whole order back.
        let mut tx = self.pool.begin().await.map_err(map_db_err)?;
        let res = sqlx::query("INSERT INTO orders (customer_id, created_at) VALUES (?, ?)")
            .bind(draft.customer_id)
            .bind(now.to_rfc3339())
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;
        let order_id = res.last_insert_rowid();
        let mut items = Vec::with_capacity(draft.items.len());
        for item in draft.items {
            let res = sqlx::query(
                "INSERT INTO order_items (order_id, product_id, quantity, created_at)
                 VALUES (?, ?, ?, ?)",
            )
            .bind(order_id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(now.to_rfc3339())
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;
            items.push(OrderItem {
                id: res.last_insert_rowid(),
                order_id,
                product_id: item.product_id,
                quantity: item.quantity,
                created_at: now,
            });
        }
        tx.commit().await.map_err(map_db_err)?;
        Ok(Order {
            id: order_id,
            customer_id: draft.customer_id,
            created_at: now,
            items,
        })
    }

    async fn get_order(&self, id: i64) -> Result<Option<Order>, RepoError> {
        let row: Option<DbOrder> =
            sqlx::query_as("SELECT id, customer_id, created_at FROM orders WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_db_err)?;
        match row {
            Some(row) => Ok(Some(self.load_order(row).await?)),
            None => Ok(None),
        }
    }

    async fn list_orders(&self) -> Result<Vec<Order>, RepoError> {
        let rows: Vec<DbOrder> =
            sqlx::query_as("SELECT id, customer_id, created_at FROM orders ORDER BY id")
                .fetch_all(&self.pool)
                .await
                .map_err(map_db_err)?;
        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            orders.push(self.load_order(row).await?);
        }
        Ok(orders)
    }
}

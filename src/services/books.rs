//! Book domain methods.

use crate::{
    error::{AppError, AppResult},
    models::Book,
    repository::entity,
    services::entities::EntityService,
};

impl EntityService<Book> {
    /// Decrease the available stock by `qty`.
    ///
    /// Fails validation if `qty` is not positive or exceeds the current
    /// stock; the stock is left untouched in both cases.
    pub async fn decrease_stock(&self, id: i64, qty: i64) -> AppResult<Book> {
        let mut tx = self.pool().begin().await?;
        let book: Book = entity::fetch(&mut tx, id).await?;

        if qty <= 0 {
            return Err(AppError::Validation(
                "Quantity must be a positive integer".to_string(),
            ));
        }
        if qty > book.stock {
            return Err(AppError::Validation(format!(
                "Cannot decrease stock by {}. Only {} items available.",
                qty, book.stock
            )));
        }

        sqlx::query("UPDATE books SET stock = stock - ? WHERE id = ?")
            .bind(qty)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let book: Book = entity::fetch(&mut tx, id).await?;
        tx.commit().await?;
        Ok(book)
    }
}

use crate::{Db, types::decode};
use ev_core::{models::Category, ports::CategoryRepository};
use sqlx::{Executor, Sqlite};

pub(super) async fn insert<'e, E>(executor: E, category: &Category) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("insert into categories (name) values ($1) on conflict do nothing")
        .bind(category.as_str())
        .execute(executor)
        .await?;

    Ok(result.rows_affected() == 1)
}

impl CategoryRepository for Db {
    async fn list_categories(&self) -> Result<Vec<Category>, Self::Error> {
        let names = sqlx::query_scalar::<_, String>("select name from categories order by rowid")
            .fetch_all(&self.reader)
            .await?;

        names.into_iter().map(|name| decode(name.parse())).collect()
    }

    async fn add_category(&self, category: &Category) -> Result<bool, Self::Error> {
        insert(&self.writer, category).await
    }

    async fn remove_category(&self, category: &Category) -> Result<bool, Self::Error> {
        let result = sqlx::query("delete from categories where name = $1")
            .bind(category.as_str())
            .execute(&self.writer)
            .await?;

        Ok(result.rows_affected() == 1)
    }
}

//! Repository backend.
//!
//! Works on whole entities: updates load the current row, change fields in
//! memory and save every non-key column back. The report view is assembled
//! in memory from per-table reads, with clients and products preloaded
//! into lookup maps.

use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, info};

use super::{begin_failed, log_affected, rollback, BackendKind, DataAccess};
use crate::error::{DbError, DbResult};
use crate::pool::Database;
use crate::repository::customer::{CustomerRepository, NewCustomer};
use crate::repository::customer_product::CustomerProductRepository;
use crm_core::validation::split_full_name;
use crm_core::{
    Client, Customer, CustomerProduct, CustomerProductRow, CustomerRow, DatabaseState, EntityId,
    Product,
};

/// [`DataAccess`] built on the entity repositories.
#[derive(Debug, Clone)]
pub struct RepositoryBackend {
    db: Database,
}

impl RepositoryBackend {
    pub fn new(db: Database) -> Self {
        RepositoryBackend { db }
    }

    async fn load_customer(&self, id: EntityId) -> DbResult<Customer> {
        self.db
            .customers()
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }
}

#[async_trait]
impl DataAccess for RepositoryBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Repository
    }

    async fn insert_client(&self, name: &str) -> DbResult<Client> {
        info!(name = %name, "Insert client");
        self.db.clients().insert(name).await
    }

    async fn insert_customer(
        &self,
        code: &str,
        first_name: &str,
        last_name: &str,
        email: &str,
        client: &Client,
    ) -> DbResult<Customer> {
        info!(
            first_name = %first_name,
            last_name = %last_name,
            client_id = client.id,
            "Insert customer"
        );

        self.db
            .customers()
            .insert(NewCustomer {
                code,
                first_name,
                last_name,
                email_address: email,
                client_id: client.id,
            })
            .await
    }

    async fn insert_product(&self, name: &str) -> DbResult<Product> {
        info!(name = %name, "Insert product");
        self.db.products().insert(name).await
    }

    async fn list_clients(&self) -> DbResult<Vec<Client>> {
        self.db.clients().list_all().await
    }

    async fn list_customers(&self) -> DbResult<Vec<Customer>> {
        self.db.customers().list_all().await
    }

    async fn list_products(&self) -> DbResult<Vec<Product>> {
        self.db.products().list_all().await
    }

    async fn update_customer_name(
        &self,
        customer: &Customer,
        new_full_name: &str,
    ) -> DbResult<u64> {
        info!(id = customer.id, new_full_name = %new_full_name, "Update customer name");
        let (first_name, last_name) = split_full_name(new_full_name)?;

        let mut current = self.load_customer(customer.id).await?;
        current.first_name = first_name;
        current.last_name = last_name;

        let rows = self.db.customers().save(&current).await?;
        log_affected("Update customer name", rows);
        Ok(rows)
    }

    async fn update_product_name(&self, product: &Product, new_name: &str) -> DbResult<u64> {
        info!(id = product.id, new_name = %new_name, "Update product name");

        let mut current = self
            .db
            .products()
            .get_by_id(product.id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", product.id))?;
        current.name = new_name.to_string();

        let rows = self.db.products().save(&current).await?;
        log_affected("Update product name", rows);
        Ok(rows)
    }

    async fn update_customer_email_and_link_to_product(
        &self,
        customer: &Customer,
        new_email: &str,
        product: &Product,
    ) -> DbResult<CustomerProduct> {
        info!(id = customer.id, new_email = %new_email, "Update customer email address");
        let mut tx = self.db.pool().begin().await.map_err(begin_failed)?;

        let current = CustomerRepository::get_by_id_in(&mut *tx, customer.id).await;
        let current = match current {
            Ok(Some(current)) => current,
            Ok(None) => return Err(rollback(tx, DbError::not_found("Customer", customer.id)).await),
            Err(e) => return Err(rollback(tx, e).await),
        };

        let updated = Customer {
            email_address: new_email.to_string(),
            ..current
        };
        let rows = CustomerRepository::save_in(&mut *tx, &updated).await;
        let rows = match rows {
            Ok(rows) => rows,
            Err(e) => return Err(rollback(tx, e).await),
        };
        log_affected("Update customer email", rows);

        info!(product_id = product.id, customer_id = customer.id, "Link product to customer");
        let link = CustomerProductRepository::insert_in(&mut *tx, customer.id, product.id).await;
        let link = match link {
            Ok(link) => link,
            Err(e) => return Err(rollback(tx, e).await),
        };
        log_affected("Link customer to product", 1);

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        Ok(link)
    }

    async fn delete_client(&self, client: &Client) -> DbResult<u64> {
        info!(id = client.id, "Delete client");
        let rows = self.db.clients().delete(client.id).await?;
        log_affected("Delete client", rows);
        Ok(rows)
    }

    async fn update_client_name(&self, client: &Client, new_name: &str) -> DbResult<u64> {
        info!(id = client.id, new_name = %new_name, "Update client name");

        let mut current = self
            .db
            .clients()
            .get_by_id(client.id)
            .await?
            .ok_or_else(|| DbError::not_found("Client", client.id))?;
        current.name = new_name.to_string();

        let rows = self.db.clients().save(&current).await?;
        log_affected("Update client name", rows);
        Ok(rows)
    }

    async fn delete_customer(&self, customer: &Customer) -> DbResult<u64> {
        info!(id = customer.id, "Delete customer");
        let rows = self.db.customers().delete(customer.id).await?;
        log_affected("Delete customer", rows);
        Ok(rows)
    }

    async fn delete_product(&self, product: &Product) -> DbResult<u64> {
        info!(id = product.id, "Delete product");
        let rows = self.db.products().delete(product.id).await?;
        log_affected("Delete product", rows);
        Ok(rows)
    }

    async fn delete_all_customers(&self) -> DbResult<u64> {
        info!("Delete all customers");
        let rows = self.db.customers().delete_all().await?;
        log_affected("Delete all customers", rows);
        Ok(rows)
    }

    async fn delete_all_products(&self) -> DbResult<u64> {
        info!("Delete all products");
        let rows = self.db.products().delete_all().await?;
        log_affected("Delete all products", rows);
        Ok(rows)
    }

    async fn delete_all_clients(&self) -> DbResult<u64> {
        info!("Delete all clients");
        let rows = self.db.clients().delete_all().await?;
        log_affected("Delete all clients", rows);
        Ok(rows)
    }

    async fn list_state(&self) -> DbResult<DatabaseState> {
        let clients = self.db.clients().list_all().await?;
        let products = self.db.products().list_all().await?;
        let customers = self.db.customers().list_all().await?;
        let links = self.db.customer_products().list_all().await?;

        let client_names: HashMap<EntityId, &str> =
            clients.iter().map(|c| (c.id, c.name.as_str())).collect();
        let product_names: HashMap<EntityId, &str> =
            products.iter().map(|p| (p.id, p.name.as_str())).collect();

        // Links are already in id order; grouping keeps that order per customer
        let mut linked: HashMap<EntityId, Vec<String>> = HashMap::new();
        for link in &links {
            if let Some(name) = product_names.get(&link.product_id) {
                linked
                    .entry(link.customer_id)
                    .or_default()
                    .push(name.to_string());
            }
        }

        let mut by_last_name: Vec<&Customer> = customers.iter().collect();
        by_last_name.sort_by(|a, b| a.last_name.cmp(&b.last_name).then(a.id.cmp(&b.id)));

        let customer_products: Vec<CustomerProductRow> = by_last_name
            .iter()
            .flat_map(|customer| {
                linked
                    .get(&customer.id)
                    .into_iter()
                    .flatten()
                    .map(move |product_name| CustomerProductRow {
                        code: customer.code.clone(),
                        first_name: customer.first_name.clone(),
                        last_name: customer.last_name.clone(),
                        product_name: product_name.clone(),
                    })
            })
            .collect();

        let customer_rows: Vec<CustomerRow> = customers
            .iter()
            .map(|c| CustomerRow {
                id: c.id,
                code: c.code.clone(),
                first_name: c.first_name.clone(),
                last_name: c.last_name.clone(),
                email_address: c.email_address.clone(),
                client_name: client_names
                    .get(&c.client_id)
                    .map(|name| name.to_string())
                    .unwrap_or_default(),
                created_at: c.created_at,
                updated_at: c.updated_at,
                product_names: linked.get(&c.id).cloned().unwrap_or_default(),
            })
            .collect();

        debug!(
            clients = clients.len(),
            products = products.len(),
            links = customer_products.len(),
            "Loaded database state"
        );

        Ok(DatabaseState {
            clients,
            products,
            customers: customer_rows,
            customer_products,
        })
    }
}

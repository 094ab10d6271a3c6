use crate::deals::product::{DealLine, Product};
use crate::error::{ListError, Result};
use crate::item::{ItemSource, Snapshot};
use indexmap::{IndexMap, IndexSet};
use log::warn;

/// An open contract. `dealer: None` is the player's own contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contract {
    pub dealer: Option<String>,
    /// `(product id, quantity)` pairs
    pub entries: Vec<(String, u32)>,
}

impl Contract {
    pub fn player(entries: Vec<(String, u32)>) -> Self {
        Self {
            dealer: None,
            entries,
        }
    }

    pub fn dealer(name: impl Into<String>, entries: Vec<(String, u32)>) -> Self {
        Self {
            dealer: Some(name.into()),
            entries,
        }
    }

    pub fn is_player(&self) -> bool {
        self.dealer.is_none()
    }
}

/// Catalog, listings and open contracts
#[derive(Debug, Default)]
pub struct DealBook {
    catalog: Option<IndexMap<String, Product>>,
    listed: IndexSet<String>,
    contracts: Vec<Contract>,
}

impl DealBook {
    /// A book whose catalog has not been loaded yet. Snapshots report a missing
    /// dependency until a product is added.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(products: impl IntoIterator<Item = Product>) -> Self {
        let mut book = Self::new();
        book.catalog = Some(IndexMap::new());
        for product in products {
            book.add_product(product);
        }
        book
    }

    pub fn add_product(&mut self, product: Product) {
        self.catalog
            .get_or_insert_with(IndexMap::new)
            .insert(product.id.clone(), product);
    }

    pub fn catalog(&self) -> impl Iterator<Item = &Product> + '_ {
        self.catalog.iter().flat_map(|catalog| catalog.values())
    }

    pub fn product(&self, id: &str) -> Option<&Product> {
        self.catalog.as_ref().and_then(|catalog| catalog.get(id))
    }

    /// Mark a product as listed for sale. Returns false if it already was.
    pub fn list_product(&mut self, id: impl Into<String>) -> bool {
        self.listed.insert(id.into())
    }

    pub fn unlist_product(&mut self, id: &str) -> bool {
        self.listed.shift_remove(id)
    }

    pub fn listed(&self) -> impl Iterator<Item = &str> + '_ {
        self.listed.iter().map(String::as_str)
    }

    pub fn add_contract(&mut self, contract: Contract) {
        self.contracts.push(contract);
    }

    /// Remove and return the contract at `index`
    pub fn complete_contract(&mut self, index: usize) -> Option<Contract> {
        (index < self.contracts.len()).then(|| self.contracts.remove(index))
    }

    pub fn contracts(&self) -> &[Contract] {
        &self.contracts
    }

    pub fn contracts_mut(&mut self) -> &mut [Contract] {
        &mut self.contracts
    }

    /// Open quantities per product, ordered by product name.
    ///
    /// Every listed product appears even without open contracts. Contract entries for
    /// products missing from the catalog are skipped.
    pub fn lines(&self) -> Result<Vec<DealLine>> {
        let catalog = self
            .catalog
            .as_ref()
            .ok_or_else(|| ListError::missing("product catalog"))?;

        let mut totals: IndexMap<&str, (u32, u32)> = IndexMap::new();
        for contract in &self.contracts {
            for (product_id, quantity) in &contract.entries {
                if !catalog.contains_key(product_id) {
                    warn!(
                        "Contract for {} names unknown product '{}', skipping",
                        contract.dealer.as_deref().unwrap_or("player"),
                        product_id
                    );
                    continue;
                }
                let (player, dealer) = totals.entry(product_id.as_str()).or_default();
                if contract.is_player() {
                    *player = player.saturating_add(*quantity);
                } else {
                    *dealer = dealer.saturating_add(*quantity);
                }
            }
        }

        for id in &self.listed {
            if catalog.contains_key(id) {
                totals.entry(id.as_str()).or_default();
            }
        }

        let mut lines: Vec<DealLine> = totals
            .into_iter()
            .filter_map(|(id, (player_quantity, dealer_quantity))| {
                catalog.get(id).map(|product| DealLine {
                    product: product.clone(),
                    player_quantity,
                    dealer_quantity,
                })
            })
            .collect();
        lines.sort_by(|a, b| {
            a.product
                .name
                .cmp(&b.product.name)
                .then_with(|| a.product.id.cmp(&b.product.id))
        });
        Ok(lines)
    }
}

impl ItemSource for DealBook {
    fn snapshot(&self) -> Result<Snapshot> {
        Ok(self.lines()?.into_iter().map(DealLine::into_item).collect())
    }
}

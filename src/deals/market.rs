use crate::deals::book::{Contract, DealBook};
use crate::deals::product::Product;
use log::debug;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const PRODUCT_NAMES: &[&str] = &[
    "Apple", "Banana", "Cherry", "Date", "Elderberry", "Fig", "Grape", "Honeydew", "Kiwi",
    "Lemon", "Mango", "Nectarine",
];

const DEALERS: &[&str] = &["Benji", "Molly", "Brad", "Jane"];

/// One change applied to the book
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketEvent {
    ContractOpened {
        dealer: Option<String>,
        products: usize,
    },
    ContractCompleted {
        dealer: Option<String>,
    },
    QuantityChanged {
        product_id: String,
        quantity: u32,
    },
    ProductListed {
        product_id: String,
    },
    ProductUnlisted {
        product_id: String,
    },
}

/// Seeded random walk over a deal book
#[derive(Debug)]
pub struct MarketSimulator {
    rng: ChaCha8Rng,
    churn: f64,
}

impl MarketSimulator {
    /// `churn` is the probability that [`step`](Self::step) changes anything
    pub fn new(seed: u64, churn: f64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            churn: churn.clamp(0.0, 1.0),
        }
    }

    /// Build a book with the full catalog, a couple of listings and a few contracts
    pub fn opening_book(&mut self) -> DealBook {
        let mut book = DealBook::with_catalog(
            PRODUCT_NAMES
                .iter()
                .map(|name| Product::new(name.to_lowercase(), *name)),
        );
        for _ in 0..2 {
            let id = self.pick_product();
            book.list_product(id);
        }
        for _ in 0..3 {
            let contract = self.new_contract();
            book.add_contract(contract);
        }
        book
    }

    /// Maybe apply one random change to `book`
    pub fn step(&mut self, book: &mut DealBook) -> Option<MarketEvent> {
        if !self.rng.gen_bool(self.churn) {
            return None;
        }

        let event = match self.rng.gen_range(0..10) {
            0..=2 => {
                let contract = self.new_contract();
                let event = MarketEvent::ContractOpened {
                    dealer: contract.dealer.clone(),
                    products: contract.entries.len(),
                };
                book.add_contract(contract);
                event
            }
            3..=4 if !book.contracts().is_empty() => {
                let index = self.rng.gen_range(0..book.contracts().len());
                let contract = book.complete_contract(index)?;
                MarketEvent::ContractCompleted {
                    dealer: contract.dealer,
                }
            }
            5..=7 if !book.contracts().is_empty() => {
                let index = self.rng.gen_range(0..book.contracts().len());
                let quantity = self.rng.gen_range(1..=9);
                let contract = &mut book.contracts_mut()[index];
                let slot = self.rng.gen_range(0..contract.entries.len().max(1));
                let entry = contract.entries.get_mut(slot)?;
                entry.1 = quantity;
                MarketEvent::QuantityChanged {
                    product_id: entry.0.clone(),
                    quantity,
                }
            }
            8 => {
                let product_id = self.pick_product();
                if !book.list_product(product_id.clone()) {
                    return None;
                }
                MarketEvent::ProductListed { product_id }
            }
            _ => {
                let product_id = book.listed().next()?.to_string();
                book.unlist_product(&product_id);
                MarketEvent::ProductUnlisted { product_id }
            }
        };

        debug!("Market: {:?}", event);
        Some(event)
    }

    fn pick_product(&mut self) -> String {
        PRODUCT_NAMES
            .choose(&mut self.rng)
            .map_or_else(String::new, |name| name.to_lowercase())
    }

    fn new_contract(&mut self) -> Contract {
        let count = self.rng.gen_range(1..=3);
        let entries = (0..count)
            .map(|_| (self.pick_product(), self.rng.gen_range(1..=5)))
            .collect();
        if self.rng.gen_bool(0.5) {
            Contract::player(entries)
        } else {
            let dealer = DEALERS.choose(&mut self.rng).copied().unwrap_or("Benji");
            Contract::dealer(dealer, entries)
        }
    }
}

use crate::item::Item;

/// Color used for quantities the player is not responsible for
pub const MUTED_COLOR: &str = "#888888ff";

/// One product in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Product {
    pub id: String,
    pub name: String,
}

impl Product {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Open quantities of one product, split by who has to deliver them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealLine {
    pub product: Product,
    pub player_quantity: u32,
    pub dealer_quantity: u32,
}

impl DealLine {
    /// Row text: `"{player}x {name}"`, muted when the player owes nothing, followed by the
    /// dealers' share in muted parentheses when there is one
    pub fn title(&self) -> String {
        let mut title = if self.player_quantity == 0 {
            format!(
                "<color={MUTED_COLOR}>{}x {}</color>",
                self.player_quantity, self.product.name
            )
        } else {
            format!("{}x {}", self.player_quantity, self.product.name)
        };
        if self.dealer_quantity > 0 {
            title.push_str(&format!(
                " <color={MUTED_COLOR}>(+ {})</color>",
                self.dealer_quantity
            ));
        }
        title
    }

    pub fn into_item(self) -> Item {
        let title = self.title();
        Item::new(self.product.id, title)
    }
}

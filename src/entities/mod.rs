pub mod cart_item;
pub mod product;
pub mod user;

pub use cart_item::{Entity as CartItem, Model as CartItemModel};
pub use product::{Entity as Product, Model as ProductModel, ProductImages};
pub use user::{Entity as User, Model as UserModel};

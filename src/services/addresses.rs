//! Saved shipping addresses. These never leave this service.

use crate::domain::aggregates::{Address, AddressBook};
use crate::store::ClientState;
use crate::Result;

use super::session::current;

pub async fn list(client: &ClientState) -> Result<AddressBook> {
    let session = current(client).await?;
    Ok(client.address_book(&session.user.id).await?)
}

pub async fn save(client: &ClientState, address: Address) -> Result<(Address, AddressBook)> {
    let session = current(client).await?;
    let mut book = client.address_book(&session.user.id).await?;
    let saved = book.save(address)?;
    client.save_address_book(&session.user.id, &book).await?;
    Ok((saved, book))
}

pub async fn delete(client: &ClientState, id: &str) -> Result<AddressBook> {
    let session = current(client).await?;
    let mut book = client.address_book(&session.user.id).await?;
    book.delete(id)?;
    client.save_address_book(&session.user.id, &book).await?;
    Ok(book)
}

pub async fn set_default(client: &ClientState, id: &str) -> Result<AddressBook> {
    let session = current(client).await?;
    let mut book = client.address_book(&session.user.id).await?;
    book.set_default(id)?;
    client.save_address_book(&session.user.id, &book).await?;
    Ok(book)
}

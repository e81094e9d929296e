use crate::domain::order::{Order, OrderStatus};
use crate::domain::{OrderId, UserId};
use crate::error::{BotError, Result};
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct OrderRecord<'a> {
    order_id: OrderId,
    user: UserId,
    handle: &'a str,
    phone: &'a str,
    address: &'a str,
    total: u64,
    status: OrderStatus,
    created_at: String,
    items: String,
}

impl<'a> From<&'a Order> for OrderRecord<'a> {
    fn from(order: &'a Order) -> Self {
        let header = &order.header;
        Self {
            order_id: order.id,
            user: header.user_id,
            handle: header.user_handle.as_deref().unwrap_or_default(),
            phone: &header.phone,
            address: &header.address,
            total: header.total,
            status: header.status,
            created_at: header.created_at.to_rfc3339(),
            items: order
                .items
                .iter()
                .map(|line| format!("{} x{}", line.name, line.quantity))
                .collect::<Vec<_>>()
                .join(";"),
        }
    }
}

/// Writes committed orders as CSV, one row per order.
pub struct OrderWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> OrderWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_orders(&mut self, orders: &[Order]) -> Result<()> {
        for order in orders {
            self.writer.serialize(OrderRecord::from(order))?;
        }
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| BotError::IoError(e.into_error()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{OrderHeader, OrderLine};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_write_orders() {
        let order = Order {
            id: 1,
            header: OrderHeader {
                user_id: 42,
                user_handle: Some("@aziz".to_string()),
                phone: "+998901234567".to_string(),
                address: "Tashkent, street 1".to_string(),
                total: 25000,
                status: OrderStatus::New,
                created_at: Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
            },
            items: vec![
                OrderLine {
                    product_id: 1,
                    name: "A".to_string(),
                    price: 10000,
                    quantity: 2,
                },
                OrderLine {
                    product_id: 2,
                    name: "B".to_string(),
                    price: 5000,
                    quantity: 1,
                },
            ],
        };

        let mut writer = OrderWriter::new(Vec::new());
        writer.write_orders(&[order]).unwrap();
        let output = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(
            lines[0],
            "order_id,user,handle,phone,address,total,status,created_at,items"
        );
        assert_eq!(
            lines[1],
            "1,42,@aziz,+998901234567,\"Tashkent, street 1\",25000,new,2026-01-02T03:04:05+00:00,A x2;B x1"
        );
    }

    #[test]
    fn test_no_orders_writes_nothing() {
        let mut writer = OrderWriter::new(Vec::new());
        writer.write_orders(&[]).unwrap();
        assert!(writer.into_inner().unwrap().is_empty());
    }
}

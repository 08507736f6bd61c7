//! Shopify order → Hiper sales order.

use std::str::FromStr;

use rust_decimal::Decimal;
use stocksync_core::AppConfig;
use stocksync_hiper::{
    HiperAddress, HiperCustomer, HiperMarketplace, HiperOrder, HiperOrderItem, HiperPayment,
};
use stocksync_shopify::{ShopifyAddress, ShopifyLineItem, ShopifyOrder};

const DEFAULT_CUSTOMER_NAME: &str = "Cliente E-commerce";

/// Store-specific values the order payload needs but Shopify does not carry.
#[derive(Debug, Clone)]
pub(crate) struct OrderSettings {
    pub payment_method_id: u32,
    pub marketplace_cnpj: String,
    pub marketplace_name: String,
}

impl OrderSettings {
    pub(crate) fn from_config(config: &AppConfig) -> Self {
        Self {
            payment_method_id: config.payment_method_id,
            marketplace_cnpj: config.marketplace_cnpj.clone(),
            marketplace_name: config.marketplace_name.clone(),
        }
    }
}

/// Builds the sales order for `order`.
///
/// Missing customer data degrades to defaults (and shows up in
/// [`HiperOrder::validation_warnings`]); only unparseable amounts fail.
///
/// # Errors
///
/// Returns an error if a price, discount, total, or shipping amount is not a
/// decimal number.
pub(crate) fn map_order(order: &ShopifyOrder, settings: &OrderSettings) -> anyhow::Result<HiperOrder> {
    let itens = order
        .line_items
        .iter()
        .map(map_line_item)
        .collect::<anyhow::Result<Vec<_>>>()?;

    let total = parse_amount(order.total_price.as_deref(), "total_price")?;
    let shipping = parse_amount(order.shipping_amount(), "shipping")?;

    Ok(HiperOrder {
        cliente: map_customer(order),
        endereco_de_cobranca: map_address(order.billing_address.as_ref()),
        endereco_de_entrega: map_address(order.shipping_address.as_ref()),
        itens,
        meios_de_pagamento: vec![HiperPayment {
            id_meio_de_pagamento: settings.payment_method_id,
            parcelas: 1,
            valor: total,
        }],
        numero_pedido_de_venda: order.order_number.to_string(),
        observacao_do_pedido_de_venda: format!("Pedido Shopify #{}", order.order_number),
        valor_do_frete: shipping,
        marketplace: HiperMarketplace {
            cnpj: settings.marketplace_cnpj.clone(),
            nome: settings.marketplace_name.clone(),
        },
    })
}

fn map_customer(order: &ShopifyOrder) -> HiperCustomer {
    let customer = order.customer.as_ref();

    let name = customer
        .map(|c| {
            [c.first_name.as_deref(), c.last_name.as_deref()]
                .into_iter()
                .flatten()
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_CUSTOMER_NAME.to_owned());

    let email = order
        .email
        .as_deref()
        .or_else(|| customer.and_then(|c| c.email.as_deref()))
        .unwrap_or_default()
        .trim()
        .to_owned();

    // No CPF is collected at checkout; the phone number stands in.
    let documento = customer
        .and_then(|c| c.phone.as_deref())
        .map(|phone| phone.replace(['-', '(', ')', ' '], ""))
        .unwrap_or_default();

    HiperCustomer {
        documento,
        email,
        inscricao_estadual: String::new(),
        nome_do_cliente: name,
        nome_fantasia: String::new(),
    }
}

fn map_address(address: Option<&ShopifyAddress>) -> HiperAddress {
    let Some(address) = address else {
        return HiperAddress::default();
    };
    let text = |value: &Option<String>| value.as_deref().unwrap_or_default().trim().to_owned();

    HiperAddress {
        cep: text(&address.zip).replace('-', ""),
        complemento: text(&address.company),
        logradouro: text(&address.address1),
        numero: Some(text(&address.address2))
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "S/N".to_owned()),
        ..HiperAddress::default()
    }
}

/// Net unit price spreads the line discount over the units.
fn map_line_item(item: &ShopifyLineItem) -> anyhow::Result<HiperOrderItem> {
    let gross = Decimal::from_str(item.price.trim())
        .map_err(|e| anyhow::anyhow!("invalid line item price '{}': {e}", item.price))?;
    let discount = parse_amount(item.total_discount.as_deref(), "total_discount")?;
    let per_unit_discount = if item.quantity > 0 {
        discount / Decimal::from(item.quantity)
    } else {
        Decimal::ZERO
    };

    Ok(HiperOrderItem {
        produto_id: String::new(),
        quantidade: item.quantity,
        preco_unitario_bruto: gross,
        preco_unitario_liquido: (gross - per_unit_discount).round_dp(2),
    })
}

/// Missing or blank amounts count as zero.
fn parse_amount(raw: Option<&str>, field: &str) -> anyhow::Result<Decimal> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(Decimal::ZERO),
        Some(value) => Decimal::from_str(value)
            .map_err(|e| anyhow::anyhow!("invalid {field} '{value}': {e}")),
    }
}

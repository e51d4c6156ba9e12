//! Lifecycle events for the narrative view
//!
//! A facility's role decides which lifecycle stages it contributes:
//!
//! | Role          | Events                       |
//! |---------------|------------------------------|
//! | `FARM`        | incubation, grow, feeding    |
//! | `SLAUGHTERER` | sacrifice                    |
//! | other         | none                         |
//!
//! The delivery stage is not tied to a facility; see `narrative`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::custom_fields::{CustomFields, consumer_app_fields};
use super::error::ProvenanceError;
use super::index::Direction;
use super::record_set::RecordSet;
use super::types::{Event, Facility, PartyRole};

const INCUBATION_NAME: &str = "Incubación";
const GROW_NAME: &str = "Cria";
const FEEDING_NAME: &str = "Alimentación";
const SACRIFICE_NAME: &str = "Sacrificio";
const DELIVERY_NAME: &str = "Plataforma de distribución";

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IncubationEvent {
    pub event_name: String,
    pub name_incubation: String,
    pub date_born: String,
    pub date_incubation_end: String,
    pub logo_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GrowEvent {
    pub event_name: String,
    pub grow_process: String,
    pub grow_system: String,
    pub origin_farm: String,
    pub city: String,
    pub logo_url: String,
    pub url_video: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedingEvent {
    pub event_name: String,
    pub description: String,
    pub farm_entry_date: String,
    pub farm_departure_date: String,
    pub info_url: String,
    pub logo_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SacrificeEvent {
    pub event_name: String,
    pub slaughterhouse: String,
    pub city: String,
    pub sacrifice_date: DateTime<Utc>,
    pub info_url: String,
    pub logo_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryEvent {
    pub event_name: String,
    pub delivery_address: String,
    pub logo_url: String,
}

/// One stage of an item's life as shown to consumers
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "eventType", rename_all = "lowercase")]
pub enum LifecycleEvent {
    Incubation(IncubationEvent),
    Grow(GrowEvent),
    Feeding(FeedingEvent),
    Sacrifice(SacrificeEvent),
    Delivery(DeliveryEvent),
}

impl LifecycleEvent {
    pub fn delivery(delivery_address: String) -> Self {
        Self::Delivery(DeliveryEvent {
            event_name: DELIVERY_NAME.to_string(),
            delivery_address,
            logo_url: String::new(),
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Incubation(_) => "incubation",
            Self::Grow(_) => "grow",
            Self::Feeding(_) => "feeding",
            Self::Sacrifice(_) => "sacrifice",
            Self::Delivery(_) => "delivery",
        }
    }
}

/// Resolved view of one facility inside a record set
struct FacilityContext<'a> {
    facility: &'a Facility,
    record_set: &'a RecordSet,
    outgoing: Vec<&'a Event>,
    custom_fields: CustomFields,
}

impl<'a> FacilityContext<'a> {
    fn new(facility: &'a Facility, record_set: &'a RecordSet) -> Self {
        let gln = facility.location_gln.as_str();
        Self {
            facility,
            record_set,
            outgoing: record_set.events_for(gln, Direction::Outgoing, false),
            custom_fields: consumer_app_fields(record_set.location_payloads_for(gln)),
        }
    }

    fn gln(&self) -> &str {
        &self.facility.location_gln
    }
}

/// Lifecycle events contributed by one facility
pub fn synthesize(
    facility: &Facility,
    record_set: &RecordSet,
) -> Result<Vec<LifecycleEvent>, ProvenanceError> {
    let ctx = FacilityContext::new(facility, record_set);
    match facility.role() {
        PartyRole::Farm => farm_events(&ctx),
        PartyRole::Slaughterer => Ok(vec![sacrifice_event(&ctx)?]),
        PartyRole::Other(code) => {
            tracing::trace!(gln = %ctx.gln(), role = %code, "No lifecycle stages for role");
            Ok(Vec::new())
        }
    }
}

fn farm_events(ctx: &FacilityContext<'_>) -> Result<Vec<LifecycleEvent>, ProvenanceError> {
    let epc = ctx
        .outgoing
        .iter()
        .find_map(|event| event.data.item_ids().first())
        .ok_or_else(|| {
            ProvenanceError::invariant(format!(
                "farm facility {} must have produced at least one traceable item",
                ctx.gln()
            ))
        })?;

    let item_fields = consumer_app_fields(ctx.record_set.item_payloads_for(epc));
    let date_received = item_fields.text_or_default(1);
    let address = &ctx.facility.party_address;

    Ok(vec![
        LifecycleEvent::Incubation(IncubationEvent {
            event_name: INCUBATION_NAME.to_string(),
            name_incubation: item_fields.text_or_default(0),
            date_born: date_received.clone(),
            date_incubation_end: date_received,
            logo_url: String::new(),
        }),
        LifecycleEvent::Grow(GrowEvent {
            event_name: GROW_NAME.to_string(),
            grow_process: ctx.custom_fields.text_or_default(0),
            grow_system: ctx.custom_fields.text_or_default(1),
            origin_farm: address.name.clone(),
            city: address.city.clone(),
            logo_url: String::new(),
            url_video: String::new(),
        }),
        LifecycleEvent::Feeding(FeedingEvent {
            event_name: FEEDING_NAME.to_string(),
            description: ctx.custom_fields.text_or_default(2),
            farm_entry_date: String::new(),
            farm_departure_date: String::new(),
            info_url: String::new(),
            logo_url: String::new(),
        }),
    ])
}

fn sacrifice_event(ctx: &FacilityContext<'_>) -> Result<LifecycleEvent, ProvenanceError> {
    let last = ctx.outgoing.last().ok_or_else(|| {
        ProvenanceError::invariant(format!(
            "slaughterer facility {} must have at least one outgoing event",
            ctx.gln()
        ))
    })?;
    let address = &ctx.facility.party_address;

    Ok(LifecycleEvent::Sacrifice(SacrificeEvent {
        event_name: SACRIFICE_NAME.to_string(),
        slaughterhouse: address.name.clone(),
        city: address.city.clone(),
        sacrifice_date: last.time(),
        info_url: String::new(),
        logo_url: String::new(),
    }))
}

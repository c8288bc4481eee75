//! Runtime event <-> audit entity conversion

use crate::domain::entities::AuditEventEntity;
use crate::domain::errors::ConversionError;
use serde_json::{json, Value};
use shared_types::{EventKind, EventPayload, RuntimeEvent};

/// Converts between the wire event and its flat audit record.
#[derive(Clone, Copy, Debug, Default)]
pub struct EventToEntityConverter;

impl EventToEntityConverter {
    pub fn new() -> Self {
        Self
    }

    pub fn to_entity(&self, event: &RuntimeEvent) -> Result<AuditEventEntity, ConversionError> {
        let encoded = serde_json::to_value(&event.payload).map_err(|source| {
            ConversionError::Encode {
                event_id: event.id.clone(),
                source,
            }
        })?;

        // Payload encodes as {"eventType": .., "entity": ..}
        let entity = match encoded {
            Value::Object(mut map) => map.remove("entity").unwrap_or(Value::Null),
            _ => Value::Null,
        };

        Ok(AuditEventEntity {
            event_id: event.id.clone(),
            event_type: event.kind().as_str().to_string(),
            timestamp: event.timestamp,
            app_name: event.app_name.clone(),
            app_version: event.app_version.clone(),
            service_name: event.service_name.clone(),
            service_full_name: event.service_full_name.clone(),
            service_type: event.service_type.clone(),
            service_version: event.service_version.clone(),
            process_instance_id: event.process_instance_id.clone(),
            process_definition_id: event.process_definition_id.clone(),
            business_key: event.business_key.clone(),
            parent_process_instance_id: event.parent_process_instance_id.clone(),
            sequence_number: event.sequence_number,
            entity_id: event.payload.entity_id(),
            entity,
        })
    }

    pub fn from_entity(&self, entity: &AuditEventEntity) -> Result<RuntimeEvent, ConversionError> {
        let kind: EventKind = entity
            .event_type
            .parse()
            .map_err(|_| ConversionError::UnknownEventType(entity.event_type.clone()))?;

        let payload: EventPayload = serde_json::from_value(json!({
            "eventType": kind.as_str(),
            "entity": entity.entity,
        }))
        .map_err(|source| ConversionError::MalformedEntity {
            event_type: entity.event_type.clone(),
            source,
        })?;

        Ok(RuntimeEvent {
            id: entity.event_id.clone(),
            timestamp: entity.timestamp,
            app_name: entity.app_name.clone(),
            app_version: entity.app_version.clone(),
            service_name: entity.service_name.clone(),
            service_full_name: entity.service_full_name.clone(),
            service_type: entity.service_type.clone(),
            service_version: entity.service_version.clone(),
            process_instance_id: entity.process_instance_id.clone(),
            process_definition_id: entity.process_definition_id.clone(),
            business_key: entity.business_key.clone(),
            parent_process_instance_id: entity.parent_process_instance_id.clone(),
            sequence_number: entity.sequence_number,
            payload,
        })
    }
}

use std::sync::Arc;

use async_graphql::{
    dynamic::{
        Field, FieldFuture, FieldValue, InputObject, InputValue, Object, ResolverContext, Scalar, Schema, TypeRef,
        ValueAccessor,
    },
    Error, Value,
};
use gateway_config::FieldType;
use runtime::store::{Document, ATTACHMENTS_FIELD, ETAG_FIELD, ID_FIELD, RID_FIELD, SELF_FIELD, TS_FIELD};

use crate::{
    dispatch::{self, QueryArguments},
    mutation::{self, UpsertOutcome},
    resolvers,
    session::OperationSession,
    settings::{self, SchemaError, SchemaSettings},
};

const QUERY_TYPE: &str = "Query";
const MUTATION_TYPE: &str = "Mutation";
const CONTAINER_TYPE: &str = "Container";
const CONTAINER_INPUT_TYPE: &str = "ContainerInput";
const UPSERT_RESULT_TYPE: &str = "UpsertResult";
const JSON_SCALAR: &str = "JSON";

/// Builds the executable schema for the container described by the settings.
pub(crate) fn build(settings: Arc<SchemaSettings>) -> Result<Schema, SchemaError> {
    let mut builder = Schema::build(QUERY_TYPE, Some(MUTATION_TYPE), None)
        .register(Scalar::new(JSON_SCALAR).description("Any JSON value"))
        .register(container_type(&settings))
        .register(container_input_type(&settings))
        .register(upsert_result_type(&settings))
        .register(query_type(&settings))
        .register(mutation_type())
        .data(settings.clone());

    if !settings.introspection() {
        builder = builder.disable_introspection();
    }

    builder.finish().map_err(|err| SchemaError::Build(err.to_string()))
}

fn type_ref(field_type: FieldType) -> TypeRef {
    TypeRef::named(field_type.as_str())
}

fn document<'a>(ctx: &ResolverContext<'a>) -> Result<&'a Document, Error> {
    ctx.parent_value.try_downcast_ref::<Document>()
}

fn session<'a>(ctx: &ResolverContext<'a>) -> Result<&'a Arc<OperationSession>, Error> {
    ctx.data::<Arc<OperationSession>>()
}

fn schema_settings<'a>(ctx: &ResolverContext<'a>) -> Result<&'a Arc<SchemaSettings>, Error> {
    ctx.data::<Arc<SchemaSettings>>()
}

/// A `Container` field reading the document field of the same name.
fn document_field(name: &str, field_type: FieldType, type_ref: TypeRef) -> Field {
    let key = name.to_string();

    Field::new(name, type_ref, move |ctx| {
        let key = key.clone();

        FieldFuture::new(async move {
            let document = document(&ctx)?;
            Ok(document.get(&key).and_then(|value| resolvers::coerce(value, field_type)))
        })
    })
}

fn container_type(settings: &SchemaSettings) -> Object {
    let mut object = Object::new(CONTAINER_TYPE)
        .description("A document of the container")
        .field(document_field(ID_FIELD, FieldType::ID, TypeRef::named_nn(TypeRef::ID)))
        .field(Field::new("partitionKey", TypeRef::named(TypeRef::STRING), |ctx| {
            FieldFuture::new(async move {
                let settings = schema_settings(&ctx)?;
                let document = document(&ctx)?;

                Ok(document
                    .get(settings.partition_key_field())
                    .and_then(|value| resolvers::coerce(value, FieldType::String)))
            })
        }))
        .field(Field::new("partitionKeyField", TypeRef::named_nn(TypeRef::STRING), |ctx| {
            FieldFuture::new(async move {
                let settings = schema_settings(&ctx)?;
                Ok(Some(Value::from(settings.partition_key_field())))
            })
        }))
        .field(
            Field::new("timestamp", TypeRef::named(TypeRef::STRING), |ctx| {
                FieldFuture::new(async move {
                    let settings = schema_settings(&ctx)?;
                    let document = document(&ctx)?;

                    let timezone = match ctx.args.get("timezone").filter(|arg| !arg.is_null()) {
                        Some(timezone) => settings::parse_timezone(timezone.string()?)?,
                        None => settings.timezone(),
                    };

                    Ok(resolvers::timestamp(document, timezone).map(Value::String))
                })
            })
            .description("Last modification of the document, as an RFC 3339 date time")
            .argument(InputValue::new("timezone", TypeRef::named(TypeRef::STRING)).description("IANA timezone name")),
        )
        .field(document_field(RID_FIELD, FieldType::String, TypeRef::named(TypeRef::STRING)))
        .field(document_field(SELF_FIELD, FieldType::String, TypeRef::named(TypeRef::STRING)))
        .field(document_field(ETAG_FIELD, FieldType::String, TypeRef::named(TypeRef::STRING)))
        .field(document_field(TS_FIELD, FieldType::Int, TypeRef::named(TypeRef::INT)))
        .field(document_field(
            ATTACHMENTS_FIELD,
            FieldType::String,
            TypeRef::named(TypeRef::STRING),
        ));

    if let Some(field) = settings.exposed_partition_key_field() {
        object = object.field(document_field(field, FieldType::String, TypeRef::named(TypeRef::STRING)));
    }

    for field in settings.fields() {
        object = object.field(document_field(&field.name, field.r#type, type_ref(field.r#type)));
    }

    object
}

fn container_input_type(settings: &SchemaSettings) -> InputObject {
    let mut input = InputObject::new(CONTAINER_INPUT_TYPE)
        .description("A document to create or replace. A missing id is generated.")
        .field(InputValue::new(ID_FIELD, TypeRef::named(TypeRef::ID)));

    if let Some(field) = settings.exposed_partition_key_field() {
        input = input.field(InputValue::new(field, TypeRef::named(TypeRef::STRING)));
    }

    for field in settings.fields() {
        input = input.field(InputValue::new(&field.name, type_ref(field.r#type)));
    }

    input
}

fn upsert_result_type(settings: &SchemaSettings) -> Object {
    fn outcome<'a>(ctx: &ResolverContext<'a>) -> Result<&'a UpsertOutcome, Error> {
        ctx.parent_value.try_downcast_ref::<UpsertOutcome>()
    }

    let mut object = Object::new(UPSERT_RESULT_TYPE)
        .field(Field::new("status", TypeRef::named_nn(TypeRef::BOOLEAN), |ctx| {
            FieldFuture::new(async move { Ok(Some(Value::Boolean(outcome(&ctx)?.is_success()))) })
        }))
        .field(Field::new("error", TypeRef::named(TypeRef::STRING), |ctx| {
            FieldFuture::new(async move { Ok(outcome(&ctx)?.error().map(Value::String)) })
        }))
        .field(Field::new(ID_FIELD, TypeRef::named(TypeRef::ID), |ctx| {
            FieldFuture::new(async move {
                Ok(outcome(&ctx)?
                    .document()
                    .and_then(|document| document.get(ID_FIELD))
                    .and_then(|id| resolvers::coerce(id, FieldType::ID)))
            })
        }))
        .field(Field::new("partitionKeyValue", TypeRef::named(TypeRef::STRING), |ctx| {
            FieldFuture::new(async move { Ok(outcome(&ctx)?.partition_key().map(Value::from)) })
        }))
        .field(Field::new("document", TypeRef::named(CONTAINER_TYPE), |ctx| {
            FieldFuture::new(async move {
                Ok(outcome(&ctx)?
                    .document()
                    .map(|document| FieldValue::owned_any(document.clone())))
            })
        }));

    for field in settings.fields() {
        let key = field.name.clone();
        let field_type = field.r#type;

        object = object.field(Field::new(&field.name, type_ref(field_type), move |ctx| {
            let key = key.clone();

            FieldFuture::new(async move {
                Ok(outcome(&ctx)?
                    .document()
                    .and_then(|document| document.get(&key))
                    .and_then(|value| resolvers::coerce(value, field_type)))
            })
        }));
    }

    object
}

fn query_type(settings: &SchemaSettings) -> Object {
    let filter_fields: Vec<String> = settings.filter_fields().map(|field| field.name.clone()).collect();

    let mut container = Field::new("container", TypeRef::named_nn_list(CONTAINER_TYPE), move |ctx| {
        let filter_fields = filter_fields.clone();

        FieldFuture::new(async move {
            let arguments = query_arguments(&ctx, &filter_fields)?;
            let session = session(&ctx)?;

            let documents = dispatch::dispatch(session, &arguments).await?;

            Ok(Some(FieldValue::list(documents.into_iter().map(FieldValue::owned_any))))
        })
    })
    .description("Documents of the container. Point read with both `id` and `partitionKeyValue`, a scan without any filter, a query otherwise.")
    .argument(InputValue::new(ID_FIELD, TypeRef::named(TypeRef::ID)))
    .argument(InputValue::new("partitionKeyValue", TypeRef::named(TypeRef::STRING)))
    .argument(InputValue::new("maxItemCount", TypeRef::named(TypeRef::INT)).description("Page size"))
    .argument(
        InputValue::new("continuation", TypeRef::named(TypeRef::STRING))
            .description("Continuation returned by a previous query, to fetch the next page"),
    );

    for field in settings.filter_fields() {
        container = container.argument(InputValue::new(&field.name, type_ref(field.r#type)));
    }

    Object::new(QUERY_TYPE)
        .field(container)
        .field(costs_field())
        .field(
            Field::new("continuation", TypeRef::named(TypeRef::STRING), |ctx| {
                FieldFuture::new(async move {
                    let metadata = session(&ctx)?.metadata().await;
                    Ok(metadata.continuation.map(Value::String))
                })
            })
            .description("Continuation of the last page returned by this operation"),
        )
}

fn mutation_type() -> Object {
    let container = Field::new("container", TypeRef::named_nn(UPSERT_RESULT_TYPE), |ctx| {
        FieldFuture::new(async move {
            let settings = schema_settings(&ctx)?;
            let session = session(&ctx)?;

            let input = ctx
                .args
                .get("input")
                .and_then(|input| resolvers::document_from_input(input.as_value()));

            let outcome = mutation::upsert(session, settings, input).await?;

            Ok(Some(FieldValue::owned_any(outcome)))
        })
    })
    .description("Creates or replaces a document")
    .argument(InputValue::new("input", TypeRef::named(CONTAINER_INPUT_TYPE)));

    Object::new(MUTATION_TYPE).field(container).field(costs_field())
}

fn costs_field() -> Field {
    Field::new("costs", TypeRef::named(TypeRef::FLOAT), |ctx| {
        FieldFuture::new(async move {
            let metadata = session(&ctx)?.metadata().await;
            Ok(resolvers::float(metadata.request_charge))
        })
    })
    .description("Request units consumed by this operation")
}

fn query_arguments(ctx: &ResolverContext<'_>, filter_fields: &[String]) -> Result<QueryArguments, Error> {
    let max_item_count = match ctx.args.get("maxItemCount").filter(|arg| !arg.is_null()) {
        Some(count) => {
            let count = count.i64()?;
            let count = u32::try_from(count)
                .ok()
                .filter(|count| *count >= 1)
                .ok_or_else(|| Error::new(format!("maxItemCount must be a positive integer, got {count}")))?;

            Some(count)
        }
        None => None,
    };

    let mut filters = Vec::new();

    for name in filter_fields {
        if let Some(value) = ctx.args.get(name).filter(|arg| !arg.is_null()) {
            filters.push((name.clone(), value.as_value().clone().into_json()?));
        }
    }

    Ok(QueryArguments {
        id: string_argument(ctx.args.get(ID_FIELD)),
        partition_key: string_argument(ctx.args.get("partitionKeyValue")),
        filters,
        max_item_count,
        continuation: string_argument(ctx.args.get("continuation")),
    })
}

/// `ID` arguments may be given as numbers.
fn string_argument(value: Option<ValueAccessor<'_>>) -> Option<String> {
    match value?.as_value() {
        Value::String(value) => Some(value.clone()),
        Value::Number(value) => Some(value.to_string()),
        _ => None,
    }
}

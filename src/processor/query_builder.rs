use log::debug;

use crate::params::{AggregateParam, OrderByParam, WhereParam};
use crate::processor::record_processor::{Record, RecordProcessor};
use crate::processor::{AggregateOp, AggregateResult, ProcessorError};

/// Outcome of one query
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult<'a> {
    /// Single aggregation result, labelled with its operation
    Aggregate {
        op: AggregateOp,
        result: AggregateResult,
    },
    /// Filtered and/or sorted records
    Select {
        columns: Vec<String>,
        rows: Vec<&'a Record>,
    },
}

impl QueryResult<'_> {
    /// Header labels for the presentation layer
    pub fn header(&self) -> Vec<String> {
        match self {
            QueryResult::Aggregate { op, .. } => vec![op.to_string()],
            QueryResult::Select { columns, .. } => columns.clone(),
        }
    }

    /// Body rows as display strings
    pub fn body(&self) -> Vec<Vec<String>> {
        match self {
            QueryResult::Aggregate { result, .. } => vec![vec![result.to_string()]],
            QueryResult::Select { rows, .. } => rows
                .iter()
                .map(|row| row.values().iter().map(|v| v.to_string()).collect())
                .collect(),
        }
    }
}

/// Query over a loaded [`RecordProcessor`]: optional filter, then either an
/// aggregate or an ordering.
#[derive(Debug, Clone)]
pub struct QueryBuilder<'a> {
    processor: &'a RecordProcessor,
    filter: Option<WhereParam>,
    aggregate: Option<AggregateParam>,
    order_by: Option<OrderByParam>,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(processor: &'a RecordProcessor) -> Self {
        Self {
            processor,
            filter: None,
            aggregate: None,
            order_by: None,
        }
    }

    /// Set the filter condition
    pub fn filter(mut self, param: impl Into<Option<WhereParam>>) -> Self {
        self.filter = param.into();
        self
    }

    /// Set the aggregation
    pub fn aggregate(mut self, param: impl Into<Option<AggregateParam>>) -> Self {
        self.aggregate = param.into();
        self
    }

    /// Set the ordering
    pub fn order_by(mut self, param: impl Into<Option<OrderByParam>>) -> Self {
        self.order_by = param.into();
        self
    }

    /// Execute the query.
    ///
    /// Aggregate and order-by together are rejected before anything runs.
    /// The filter always applies first; an aggregate then short-circuits
    /// the ordering.
    pub fn execute(self) -> Result<QueryResult<'a>, ProcessorError> {
        if self.aggregate.is_some() && self.order_by.is_some() {
            return Err(ProcessorError::MutuallyExclusive);
        }

        let mut rows = self.processor.rows();

        if let Some(param) = &self.filter {
            rows = self.processor.filter(&rows, param)?;
        }

        if let Some(param) = &self.aggregate {
            let result = self.processor.aggregate(&rows, param)?;
            debug!("{} of {} over {} rows: {}", param.op(), param.column(), rows.len(), result);
            return Ok(QueryResult::Aggregate {
                op: param.op(),
                result,
            });
        }

        if let Some(param) = &self.order_by {
            rows = self.processor.order_by(&rows, param)?;
        }

        Ok(QueryResult::Select {
            columns: self.processor.schema().headers(),
            rows,
        })
    }
}

impl RecordProcessor {
    pub fn query(&self) -> QueryBuilder<'_> {
        QueryBuilder::new(self)
    }
}
